use bridge_envelope::{ClonableError, CodecError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Virtual fetch for '{path}' failed with status {status}")]
    ResourceFetch { path: String, status: u16 },

    #[error("Transport channel closed with the request in flight")]
    TransportClosed,

    #[error("Sandboxed context raised: {0}")]
    Remote(ClonableError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, HostError>;
