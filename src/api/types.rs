use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LANGUAGE: &str = "en";

/// TheTVDB account credentials, in the `login.json` layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "apikey")]
    pub api_key: String,

    #[serde(rename = "userkey", default)]
    pub user_key: String,

    #[serde(rename = "username", default)]
    pub user_name: String,

    /// Language episode titles are requested in
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        user_key: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            user_key: user_key.into(),
            user_name: user_name.into(),
            language: default_language(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Authenticated session returned by a provider login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub season: u32,
    /// Aired episode number within the season
    pub episode: u32,
    pub title: String,
}

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thetvdb.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Errors that can occur when talking to the metadata API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("Rate limited by TheTVDB")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("API returned error: {0}")]
    ServerError(String),

    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded { attempts: u32 },
}

impl ApiError {
    /// Whether a fresh attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited
                | ApiError::NetworkError(_)
                | ApiError::Timeout
                | ApiError::ServerError(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::ParseError(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

/// Errors while locating or reading credentials
#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("No TheTVDB credentials configured")]
    NotConfigured,

    #[error("Cannot read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credentials file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
