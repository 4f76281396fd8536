use std::path::{Path, PathBuf};

use tracing::info;

use super::types::Journal;
use crate::fs::FileSystem;

/// Error types for journal operations
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("No usable journal at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("Failed to write journal {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize journal: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `journal` to `path`, replacing whatever was there.
///
/// Goes through a temporary sibling file so a crash never leaves a
/// half-written journal behind.
pub fn write_journal(
    fs: &dyn FileSystem,
    path: &Path,
    journal: &Journal,
) -> Result<(), JournalError> {
    let content = serde_json::to_vec_pretty(journal)?;
    let temp_path = path.with_extension("json.tmp");

    let write_error = |source| JournalError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs.write(&temp_path, &content).map_err(write_error)?;
    fs.rename(&temp_path, path).map_err(write_error)?;

    info!(
        "Journal with {} change(s) written to: {:?}",
        journal.changes.len(),
        path
    );

    Ok(())
}
