use thiserror::Error;

pub type SearchResult<T> = std::result::Result<T, SearchError>;
pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("search api returned {status}: {body}")]
    UpstreamError { status: u16, body: String },
    #[error("search result without a video id")]
    MissingVideoId,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    StoreError(#[from] sqlx::Error),
    #[error("cache database error: {0}")]
    DatabaseError(#[from] crate::model::DatabaseError),
}
