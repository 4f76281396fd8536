use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rename::RenameOp;

pub const JOURNAL_VERSION: &str = "1.0";
pub const JOURNAL_FILE_NAME: &str = "telenamer-journal.json";

/// Well-known journal location in the system temp directory
pub fn default_journal_path() -> PathBuf {
    std::env::temp_dir().join(JOURNAL_FILE_NAME)
}

/// Renames committed by one run, in the order they happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Schema version for compatibility
    pub version: String,

    pub executed_at: DateTime<Utc>,

    /// Directory the renamed files live in
    pub working_directory: PathBuf,

    /// Tool version that wrote this journal
    pub tool_version: String,

    pub changes: Vec<RenameOp>,
}

impl Journal {
    pub fn new(working_directory: &Path, changes: Vec<RenameOp>) -> Self {
        Self {
            version: JOURNAL_VERSION.to_string(),
            executed_at: Utc::now(),
            working_directory: working_directory.to_path_buf(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
