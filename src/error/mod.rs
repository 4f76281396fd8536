mod codes;

pub use codes::ExitCode;

use crate::api::{ApiError, CredentialsError};
use crate::journal::JournalError;
use crate::scanner::ScannerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Target directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Credentials error: {message}")]
    Credentials {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Journal unavailable: {reason}")]
    JournalUnavailable { path: PathBuf, reason: String },

    #[error("Journal could not be written: {message}")]
    JournalWrite {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. } => ExitCode::DirectoryNotFound,
            AppError::NotADirectory { .. } => ExitCode::DirectoryNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::Credentials { .. } => ExitCode::CredentialsError,
            AppError::Api { .. } => ExitCode::GeneralError,
            AppError::JournalUnavailable { .. } => ExitCode::JournalUnavailable,
            AppError::JournalWrite { .. } => ExitCode::JournalWriteError,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::Credentials { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "TheTVDB credentials problem:\n  {}\n{}\n\
                     Provide credentials in one of these ways:\n\
                     - pass --login <FILE> with a login.json file\n\
                     - set TVDB_API_KEY, TVDB_USER_KEY and TVDB_USER_NAME (a .env file works)\n\
                     - place login.json in the telenamer config directory\n\n\
                     login.json format:\n  \
                     {{\"apikey\": \"...\", \"userkey\": \"...\", \"username\": \"...\"}}",
                    message, path_info
                )
            }

            AppError::Api { message } => {
                format!(
                    "Could not set up the TheTVDB client:\n  {}\n\n\
                     Check your network configuration and try again.",
                    message
                )
            }

            AppError::JournalUnavailable { path, reason } => {
                format!(
                    "Nothing to undo:\n  {}\nFile: {}\n\n\
                     The journal is written after every rename run and deleted \
                     once it has been undone.",
                    reason,
                    path.display()
                )
            }

            AppError::JournalWrite { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "Files were renamed but the undo journal could not be saved:\n  {}\n{}\n\
                     These renames cannot be undone automatically.",
                    message, path_info
                )
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScannerError::NotADirectory(path) => AppError::NotADirectory { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<CredentialsError> for AppError {
    fn from(err: CredentialsError) -> Self {
        match err {
            CredentialsError::NotConfigured => AppError::Credentials {
                path: None,
                message: "No TheTVDB credentials configured".to_string(),
            },
            CredentialsError::Read { path, source } => AppError::Credentials {
                path: Some(path),
                message: format!("Cannot read file: {}", source),
            },
            CredentialsError::Invalid { path, source } => AppError::Credentials {
                path: Some(path),
                message: format!("Invalid JSON: {}", source),
            },
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api {
            message: err.to_string(),
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Unavailable { path, reason } => {
                AppError::JournalUnavailable { path, reason }
            }
            JournalError::Write { path, source } => AppError::JournalWrite {
                path: Some(path),
                message: source.to_string(),
            },
            JournalError::Serialize(e) => AppError::JournalWrite {
                path: None,
                message: e.to_string(),
            },
        }
    }
}
