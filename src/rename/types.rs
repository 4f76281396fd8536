use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::fs::FileSystem;

/// Errors that can occur while applying a rename
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Failed to rename '{from}' to '{to}': {source}")]
    RenameFailed {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Target already exists: {0}")]
    TargetExists(String),

    #[error("Target already claimed by another file in this run: {0}")]
    TargetCollision(String),
}

impl RenameError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            RenameError::RenameFailed { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}

/// One file rename inside the working directory.
///
/// Names are bare file names, never paths. Swapping `source` and `target`
/// undoes the operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameOp {
    pub source: String,
    pub target: String,
}

impl RenameOp {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.source == self.target
    }

    /// Rename `dir/source` to `dir/target`. Never overwrites, never retries.
    pub fn apply(&self, fs: &dyn FileSystem, dir: &Path) -> Result<(), RenameError> {
        if self.is_noop() {
            info!("Already named: {}", self.source);
            return Ok(());
        }

        let from = dir.join(&self.source);
        let to = dir.join(&self.target);

        // A case-only rename on a case-insensitive filesystem sees itself
        if fs.exists(&to) && !fs.same_file(&from, &to) {
            warn!("Not renaming '{}': '{}' exists", self.source, self.target);
            return Err(RenameError::TargetExists(self.target.clone()));
        }

        match fs.rename(&from, &to) {
            Ok(()) => {
                info!("Renamed: {} -> {}", self.source, self.target);
                Ok(())
            }
            Err(source) => {
                warn!("Rename failed: {} -> {}: {}", self.source, self.target, source);
                Err(RenameError::RenameFailed {
                    from: self.source.clone(),
                    to: self.target.clone(),
                    source,
                })
            }
        }
    }
}
