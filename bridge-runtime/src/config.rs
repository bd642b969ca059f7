//! # Bridge Configuration
//!
//! Provides configuration management for a bridge session.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `BridgeConfig` instance that holds everything a session needs before
//! bootstrap. It enforces fail-fast validation so that a misconfigured
//! origin or a missing handler is caught at build time, not on the first
//! request.
//!
//! ## Required Dependencies
//!
//! - `page_origin` - The origin of the hosting page; same-origin decisions
//!   and relative URL resolution key off it
//! - `handler` - The sandboxed application the virtual server routes to
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_runtime::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .page_origin("https://app.example")
//!     .handler(Arc::new(MyApp))
//!     .build()?;
//! ```

use std::sync::Arc;

use bridge_server::RequestHandler;
use url::Url;

use crate::error::{Result, RuntimeError};

/// Configuration for one bridge session.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Origin of the hosting page. Requests are only redirected through the
    /// bridge when their target shares this origin.
    pub page_origin: Url,

    /// The sandboxed application (required).
    pub handler: Arc<dyn RequestHandler>,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("page_origin", &self.page_origin.as_str())
            .field("handler", &"RequestHandler { ... }")
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for [`BridgeConfig`] instances.
///
/// Validates required dependencies on [`build()`](BridgeConfigBuilder::build)
/// and returns actionable error messages when something is missing.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    page_origin: Option<String>,
    handler: Option<Arc<dyn RequestHandler>>,
}

impl BridgeConfigBuilder {
    /// Sets the page origin (required).
    ///
    /// Must be an absolute `http` or `https` URL with a host; any path or
    /// query component is kept and used as the base for relative resolution.
    pub fn page_origin(mut self, origin: impl Into<String>) -> Self {
        self.page_origin = Some(origin.into());
        self
    }

    /// Sets the sandboxed application handler (required).
    pub fn handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Builds the final `BridgeConfig` instance.
    ///
    /// Returns an error if the origin is missing, unparseable, or not
    /// `http(s)`, or if no handler was provided.
    pub fn build(self) -> Result<BridgeConfig> {
        let raw_origin = self.page_origin.ok_or_else(|| {
            RuntimeError::Config(
                "Page origin is required. Use .page_origin() to set it.".to_string(),
            )
        })?;

        let page_origin = Url::parse(&raw_origin).map_err(|e| {
            RuntimeError::Config(format!("Invalid page origin '{}': {}", raw_origin, e))
        })?;

        if !matches!(page_origin.scheme(), "http" | "https") {
            return Err(RuntimeError::Config(format!(
                "Page origin must be http or https, got '{}'",
                page_origin.scheme()
            )));
        }

        if page_origin.host_str().is_none() {
            return Err(RuntimeError::Config(format!(
                "Page origin '{}' has no host",
                page_origin
            )));
        }

        let handler = self.handler.ok_or_else(|| RuntimeError::CapabilityMissing {
            capability: "RequestHandler".to_string(),
            message: "A RequestHandler implementation is required; it is the application \
                      the virtual server routes requests to. Use .handler() to inject it."
                .to_string(),
        })?;

        Ok(BridgeConfig {
            page_origin,
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_envelope::{RequestEnvelope, ResponseEnvelope};
    use bridge_server::BoxError;

    struct NoopApp;

    #[async_trait]
    impl RequestHandler for NoopApp {
        async fn handle(
            &self,
            _request: RequestEnvelope,
        ) -> std::result::Result<ResponseEnvelope, BoxError> {
            Ok(ResponseEnvelope::new(204))
        }
    }

    #[test]
    fn test_builder_requires_page_origin() {
        let result = BridgeConfig::builder().handler(Arc::new(NoopApp)).build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Page origin is required"));
    }

    #[test]
    fn test_builder_requires_handler() {
        let result = BridgeConfig::builder()
            .page_origin("https://app.example")
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("RequestHandler"));
        assert!(err_msg.contains("virtual server"));
    }

    #[test]
    fn test_builder_rejects_unparseable_origin() {
        let result = BridgeConfig::builder()
            .page_origin("not a url")
            .handler(Arc::new(NoopApp))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid page origin"));
    }

    #[test]
    fn test_builder_rejects_non_http_scheme() {
        let result = BridgeConfig::builder()
            .page_origin("ftp://files.example")
            .handler(Arc::new(NoopApp))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be http or https"));
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = BridgeConfig::builder()
            .page_origin("https://app.example/demo/")
            .handler(Arc::new(NoopApp))
            .build()
            .unwrap();

        assert_eq!(config.page_origin.host_str(), Some("app.example"));
        assert_eq!(config.page_origin.path(), "/demo/");
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = BridgeConfig::builder()
            .page_origin("https://app.example")
            .handler(Arc::new(NoopApp))
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.page_origin, config.page_origin);
    }
}
