use bridge_envelope::CodecError;
use bridge_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Stream already completed")]
    StreamCompleted,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
