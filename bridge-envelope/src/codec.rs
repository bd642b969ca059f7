//! Wire codec for transport frames.
//!
//! A frame is a little-endian `u32` header length, a JSON header, then the
//! raw body bytes (request/response body or stream payload). Keeping bodies
//! out of the JSON header means binary payloads cross the boundary as the
//! byte buffers they already are.
//!
//! Frame layout:
//!
//! ```text
//! +-------------+-----------------+------------------+
//! | len: u32 LE | header (JSON)   | body (raw bytes) |
//! +-------------+-----------------+------------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clone_error::ClonableError;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::{CodecError, Result};

/// Everything that crosses the message channel, tagged by correlation id.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMessage {
    /// Host -> sandbox: a request awaiting exactly one terminal outcome.
    Request {
        id: Uuid,
        envelope: RequestEnvelope,
    },
    /// Sandbox -> host: successful completion of a request.
    Response {
        id: Uuid,
        envelope: ResponseEnvelope,
    },
    /// Sandbox -> host: the request errored; the error replaces a response.
    Error { id: Uuid, error: ClonableError },
    /// Host -> sandbox: open a streaming (connection-oriented) exchange.
    StreamOpen {
        id: Uuid,
        envelope: RequestEnvelope,
    },
    /// Sandbox -> host: one ordered frame of an open stream.
    StreamFrame { id: Uuid, payload: Bytes },
    /// Sandbox -> host: stream completed normally.
    StreamClose { id: Uuid },
    /// Sandbox -> host: stream completed with an error.
    StreamError { id: Uuid, error: ClonableError },
}

impl TransportMessage {
    pub fn correlation_id(&self) -> Uuid {
        match self {
            TransportMessage::Request { id, .. }
            | TransportMessage::Response { id, .. }
            | TransportMessage::Error { id, .. }
            | TransportMessage::StreamOpen { id, .. }
            | TransportMessage::StreamFrame { id, .. }
            | TransportMessage::StreamClose { id }
            | TransportMessage::StreamError { id, .. } => *id,
        }
    }
}

/// The JSON header portion of a frame. Bodies ride after it as raw bytes;
/// `has_body` disambiguates an absent request body from an empty one.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireHeader {
    Request {
        id: Uuid,
        envelope: RequestEnvelope,
        has_body: bool,
    },
    Response {
        id: Uuid,
        envelope: ResponseEnvelope,
    },
    Error {
        id: Uuid,
        error: ClonableError,
    },
    StreamOpen {
        id: Uuid,
        envelope: RequestEnvelope,
        has_body: bool,
    },
    StreamFrame {
        id: Uuid,
    },
    StreamClose {
        id: Uuid,
    },
    StreamError {
        id: Uuid,
        error: ClonableError,
    },
}

/// Encode a message into a single frame.
pub fn encode(message: &TransportMessage) -> Result<Bytes> {
    let (header, body): (WireHeader, Option<&Bytes>) = match message {
        TransportMessage::Request { id, envelope } => (
            WireHeader::Request {
                id: *id,
                envelope: envelope.clone(),
                has_body: envelope.body.is_some(),
            },
            envelope.body.as_ref(),
        ),
        TransportMessage::Response { id, envelope } => (
            WireHeader::Response {
                id: *id,
                envelope: envelope.clone(),
            },
            Some(&envelope.body),
        ),
        TransportMessage::Error { id, error } => (
            WireHeader::Error {
                id: *id,
                error: error.clone(),
            },
            None,
        ),
        TransportMessage::StreamOpen { id, envelope } => (
            WireHeader::StreamOpen {
                id: *id,
                envelope: envelope.clone(),
                has_body: envelope.body.is_some(),
            },
            envelope.body.as_ref(),
        ),
        TransportMessage::StreamFrame { id, payload } => {
            (WireHeader::StreamFrame { id: *id }, Some(payload))
        }
        TransportMessage::StreamClose { id } => (WireHeader::StreamClose { id: *id }, None),
        TransportMessage::StreamError { id, error } => (
            WireHeader::StreamError {
                id: *id,
                error: error.clone(),
            },
            None,
        ),
    };

    let header_json =
        serde_json::to_vec(&header).map_err(|e| CodecError::Encode(e.to_string()))?;
    let body_len = body.map(|b| b.len()).unwrap_or(0);

    let mut frame = BytesMut::with_capacity(4 + header_json.len() + body_len);
    frame.put_u32_le(header_json.len() as u32);
    frame.put_slice(&header_json);
    if let Some(body) = body {
        frame.put_slice(body);
    }
    Ok(frame.freeze())
}

/// Decode a single frame back into a message.
pub fn decode(mut frame: Bytes) -> Result<TransportMessage> {
    if frame.len() < 4 {
        return Err(CodecError::Truncated {
            expected: 4,
            found: frame.len(),
        });
    }
    let header_len = frame.get_u32_le() as usize;
    if frame.len() < header_len {
        return Err(CodecError::Truncated {
            expected: header_len,
            found: frame.len(),
        });
    }
    let header_bytes = frame.split_to(header_len);
    let header: WireHeader =
        serde_json::from_slice(&header_bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    let body = frame;

    let message = match header {
        WireHeader::Request {
            id,
            mut envelope,
            has_body,
        } => {
            envelope.body = attach_request_body(has_body, body)?;
            TransportMessage::Request { id, envelope }
        }
        WireHeader::Response { id, mut envelope } => {
            envelope.body = body;
            TransportMessage::Response { id, envelope }
        }
        WireHeader::Error { id, error } => TransportMessage::Error { id, error },
        WireHeader::StreamOpen {
            id,
            mut envelope,
            has_body,
        } => {
            envelope.body = attach_request_body(has_body, body)?;
            TransportMessage::StreamOpen { id, envelope }
        }
        WireHeader::StreamFrame { id } => TransportMessage::StreamFrame { id, payload: body },
        WireHeader::StreamClose { id } => TransportMessage::StreamClose { id },
        WireHeader::StreamError { id, error } => TransportMessage::StreamError { id, error },
    };
    Ok(message)
}

fn attach_request_body(has_body: bool, body: Bytes) -> Result<Option<Bytes>> {
    if has_body {
        Ok(Some(body))
    } else if body.is_empty() {
        Ok(None)
    } else {
        Err(CodecError::Decode(
            "bodyless request frame carries trailing bytes".to_string(),
        ))
    }
}
