use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode envelope header: {0}")]
    Encode(String),

    #[error("Malformed envelope: {0}")]
    Decode(String),

    #[error("Frame truncated: need {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
