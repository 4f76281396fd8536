use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::types::{RenameError, RenameOp};
use crate::fs::FileSystem;
use crate::scatter::{scatter_gather, ScatterOptions};

/// Target names handed out during one run.
///
/// The first op to claim a name wins; later ops computing the same target
/// are rejected instead of overwriting it.
#[derive(Debug, Default)]
pub struct TargetClaims {
    claimed: Mutex<HashSet<String>>,
}

impl TargetClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, op: &RenameOp) -> Result<(), RenameError> {
        if op.is_noop() {
            return Ok(());
        }

        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if claimed.insert(op.target.clone()) {
            Ok(())
        } else {
            debug!("Target '{}' already claimed, rejecting '{}'", op.target, op.source);
            Err(RenameError::TargetCollision(op.target.clone()))
        }
    }
}

#[derive(Debug)]
pub struct RenameFailure {
    pub op: RenameOp,
    pub error: RenameError,
}

/// Result of applying a batch of renames
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<RenameOp>,
    pub failed: Vec<RenameFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Claim the target, then apply `op` on the blocking pool.
pub async fn apply_claimed(
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    claims: Arc<TargetClaims>,
    op: RenameOp,
) -> Result<RenameOp, RenameFailure> {
    if let Err(error) = claims.claim(&op) {
        return Err(RenameFailure { op, error });
    }

    let attempted = op.clone();
    let outcome = tokio::task::spawn_blocking(move || op.apply(fs.as_ref(), &dir)).await;

    match outcome {
        Ok(Ok(())) => Ok(attempted),
        Ok(Err(error)) => Err(RenameFailure {
            op: attempted,
            error,
        }),
        Err(join_error) => {
            let error = RenameError::RenameFailed {
                from: attempted.source.clone(),
                to: attempted.target.clone(),
                source: io::Error::other(join_error.to_string()),
            };
            Err(RenameFailure {
                op: attempted,
                error,
            })
        }
    }
}

/// Apply `ops` concurrently, one task per op, and wait for all of them.
///
/// A failure never cancels siblings; it is collected into the outcome.
pub async fn rename_files(fs: Arc<dyn FileSystem>, dir: &Path, ops: Vec<RenameOp>) -> BatchOutcome {
    let total = ops.len();
    let claims = Arc::new(TargetClaims::new());
    let dir = dir.to_path_buf();

    let results = scatter_gather(ops, ScatterOptions::unordered(), |op| {
        apply_claimed(Arc::clone(&fs), dir.clone(), Arc::clone(&claims), op)
    })
    .await;

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(op) => outcome.succeeded.push(op),
            Err(failure) => outcome.failed.push(failure),
        }
    }

    info!(
        "Renamed {}/{} files ({} failed)",
        outcome.succeeded.len(),
        total,
        outcome.failed.len()
    );

    outcome
}
