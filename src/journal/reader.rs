use std::path::Path;

use super::types::*;
use super::writer::JournalError;
use crate::fs::FileSystem;

/// Read and parse a journal file
pub fn read_journal(fs: &dyn FileSystem, path: &Path) -> Result<Journal, JournalError> {
    let unavailable = |reason: String| JournalError::Unavailable {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs
        .read(path)
        .map_err(|e| unavailable(format!("cannot open file: {}", e)))?;

    let journal: Journal =
        serde_json::from_slice(&content).map_err(|e| unavailable(format!("invalid JSON: {}", e)))?;

    if journal.version != JOURNAL_VERSION {
        return Err(unavailable(format!(
            "version mismatch: expected {}, found {}",
            JOURNAL_VERSION, journal.version
        )));
    }

    Ok(journal)
}
