use thiserror::Error;

use crate::models::Build;

#[derive(Error, Debug)]
pub enum BuildLensError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache storage error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildLensError>;

/// Error returned by a multi-bucket listing. Buckets already fetched before the
/// failure are kept in `partial` rather than discarded.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ListError {
    pub partial: Vec<Build>,
    #[source]
    pub source: BuildLensError,
}
