use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid repository name: {0:?} (expected owner/name)")]
    InvalidRepository(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Why adding a repository to the tracked list did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("{0} is already tracked")]
    Duplicate(String),

    /// A newer submit superseded this lookup; its result was dropped.
    #[error("stale lookup result")]
    Stale,
}
