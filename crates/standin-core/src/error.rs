use thiserror::Error;

/// Errors raised while building or materializing mock values.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed request or response part: {0}")]
    Http(#[from] axum::http::Error),
}

pub type Result<T> = std::result::Result<T, MockError>;
