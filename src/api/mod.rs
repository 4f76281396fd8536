mod client;
mod types;

pub use client::TvdbClient;
pub use types::{
    ApiConfig, ApiError, Credentials, CredentialsError, EpisodeRecord, SeriesRecord, Session,
    DEFAULT_LANGUAGE,
};

use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of canonical series and episode records.
///
/// Every call stands alone; callers log in for each lookup rather than
/// sharing a session between tasks.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    async fn search_series(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Vec<SeriesRecord>, ApiError>;

    async fn series_episodes(
        &self,
        session: &Session,
        series_id: u64,
    ) -> Result<Vec<EpisodeRecord>, ApiError>;
}

/// Environment variable names for TheTVDB credentials
pub const ENV_TVDB_API_KEY: &str = "TVDB_API_KEY";
pub const ENV_TVDB_USER_KEY: &str = "TVDB_USER_KEY";
pub const ENV_TVDB_USER_NAME: &str = "TVDB_USER_NAME";
pub const ENV_TVDB_LANGUAGE: &str = "TVDB_LANGUAGE";

pub const CREDENTIALS_FILE_NAME: &str = "login.json";

/// Load credentials from environment variables
///
/// These can be set in a `.env` file in the working directory.
pub fn credentials_from_env() -> Credentials {
    let mut credentials = Credentials::new(
        env::var(ENV_TVDB_API_KEY).unwrap_or_default(),
        env::var(ENV_TVDB_USER_KEY).unwrap_or_default(),
        env::var(ENV_TVDB_USER_NAME).unwrap_or_default(),
    );

    if let Ok(language) = env::var(ENV_TVDB_LANGUAGE) {
        if !language.is_empty() {
            credentials.language = language;
        }
    }

    credentials
}

/// Read a `login.json` credentials file
pub fn load_credentials_file(path: &Path) -> Result<Credentials, CredentialsError> {
    let content = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CredentialsError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Find credentials, in order: explicit file, environment, user config
/// directory, next to the executable.
pub fn resolve_credentials(explicit: Option<&Path>) -> Result<Credentials, CredentialsError> {
    if let Some(path) = explicit {
        debug!("Loading credentials from {:?}", path);
        return load_credentials_file(path);
    }

    let from_env = credentials_from_env();
    if from_env.is_configured() {
        debug!("Using credentials from environment");
        return Ok(from_env);
    }

    for candidate in default_credential_paths() {
        if candidate.is_file() {
            debug!("Loading credentials from {:?}", candidate);
            return load_credentials_file(&candidate);
        }
    }

    Err(CredentialsError::NotConfigured)
}

fn default_credential_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("telenamer").join(CREDENTIALS_FILE_NAME));
    }

    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join(CREDENTIALS_FILE_NAME));
    }

    paths
}
