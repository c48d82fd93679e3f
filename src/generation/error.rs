use thiserror::Error;

use super::normalize::NormalizeError;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("generator returned {status}: {body}")]
    UpstreamError { status: u16, body: String },
    #[error("generator returned no text")]
    EmptyResponse,
    #[error("{0}")]
    NormalizeError(#[from] NormalizeError),
}
