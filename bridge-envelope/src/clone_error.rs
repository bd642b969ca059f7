//! Error cloning adapter.
//!
//! Native error values cannot cross the isolation boundary; only plain data
//! can. [`ClonableError`] is a value-only mirror of a thrown error: kind,
//! message, optional stack text and an optional cause chain, each link
//! independently converted. On the receiving side the value itself is the
//! reconstructed throwable - it implements [`std::error::Error`] with
//! `source()` walking the cause chain, so logging and display observe the
//! same shape the original had.

use std::any::Any;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

/// Kind assigned to non-error thrown values (panic payloads).
pub const NON_STANDARD_THROW: &str = "NonStandardThrow";

/// Kind marking the cutoff point of a cyclic cause chain.
pub const TRUNCATED_CAUSE: &str = "TruncatedCause";

/// A structurally-cloneable mirror of a thrown error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClonableError {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ClonableError>>,
}

impl ClonableError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(mut self, cause: ClonableError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Convert a native error and its full `source()` chain.
    ///
    /// Each link is converted independently. Cyclic chains (an error whose
    /// source eventually points back at an already-visited link) are cut off
    /// with a [`TRUNCATED_CAUSE`] marker instead of looping.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut visited: Vec<*const ()> = Vec::new();
        Self::convert(err, &mut visited)
    }

    fn convert(err: &(dyn StdError + 'static), visited: &mut Vec<*const ()>) -> Self {
        // An error that is already value-only crosses as-is, kind preserved.
        if let Some(clonable) = err.downcast_ref::<ClonableError>() {
            return clonable.clone();
        }

        let identity = err as *const (dyn StdError + 'static) as *const ();
        if visited.contains(&identity) {
            return ClonableError::new(TRUNCATED_CAUSE, "cause chain cycles back on itself");
        }
        visited.push(identity);

        let cause = err
            .source()
            .map(|source| Box::new(Self::convert(source, visited)));

        ClonableError {
            kind: "Error".to_string(),
            message: err.to_string(),
            stack: None,
            cause,
        }
    }

    /// Convert an arbitrary thrown value (a panic payload).
    ///
    /// String payloads keep their text; anything else gets a best-effort
    /// placeholder message.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string value thrown inside the sandboxed context".to_string()
        };
        ClonableError::new(NON_STANDARD_THROW, message)
    }

    /// Number of links in the cause chain, this error included.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut current = self.cause.as_deref();
        while let Some(link) = current {
            len += 1;
            current = link.cause.as_deref();
        }
        len
    }
}

impl std::fmt::Display for ClonableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for ClonableError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}
