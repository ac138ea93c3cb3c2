use std::fmt;

use crate::error::{Result, TrackerError};

const REPOSITORY_PREFIX: &str = "/repository/";

/// Navigation target. The detail route carries the repository id percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    RepositoryList,
    Repository(String),
}

impl Route {
    pub fn repository(name: impl Into<String>) -> Self {
        Route::Repository(name.into())
    }

    pub fn path(&self) -> String {
        match self {
            Route::RepositoryList => "/".to_string(),
            Route::Repository(name) => {
                format!("{}{}", REPOSITORY_PREFIX, urlencoding::encode(name))
            }
        }
    }

    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() || path == "/" {
            return Ok(Route::RepositoryList);
        }

        let param = path
            .strip_prefix(REPOSITORY_PREFIX)
            .filter(|p| !p.is_empty() && !p.contains('/'))
            .ok_or_else(|| TrackerError::InvalidRoute(path.to_string()))?;

        Ok(Route::Repository(decode_param(param)?))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decode a percent-encoded route parameter
pub fn decode_param(param: &str) -> Result<String> {
    urlencoding::decode(param)
        .map(|s| s.into_owned())
        .map_err(|e| TrackerError::InvalidRoute(format!("{}: {}", param, e)))
}
