use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::journal::{read_journal, JournalError};
use crate::progress::Progress;
use crate::rename::{rename_files, RenameFailure, RenameOp};

/// Result of replaying a journal in reverse
#[derive(Debug)]
pub struct UndoReport {
    /// Reverse ops that were applied (current name -> original name)
    pub restored: Vec<RenameOp>,
    pub failed: Vec<RenameFailure>,
    pub journal_path: PathBuf,
    pub executed_at: DateTime<Utc>,
    pub working_directory: PathBuf,
}

/// Reverse every rename recorded in the journal at `journal_path`.
///
/// Changes are undone newest first. The journal is deleted afterwards,
/// even when individual files could not be restored.
pub async fn undo(
    fs: Arc<dyn FileSystem>,
    journal_path: &Path,
    progress: &mut Progress,
) -> Result<UndoReport, JournalError> {
    info!("Loading journal from: {:?}", journal_path);

    let journal = read_journal(fs.as_ref(), journal_path)?;
    let total = journal.changes.len();

    info!(
        "Journal contains {} changes from {}",
        total, journal.executed_at
    );
    progress.undo_start(total, &journal.executed_at.to_string());

    let reversed: Vec<RenameOp> = journal.changes.iter().rev().map(RenameOp::reversed).collect();

    let mut restored = Vec::with_capacity(total);
    let mut failed = Vec::new();

    for wave in independent_waves(reversed) {
        debug!("Undoing wave of {} rename(s)", wave.len());

        let outcome = rename_files(Arc::clone(&fs), &journal.working_directory, wave).await;

        for op in outcome.succeeded {
            progress.rename_progress(restored.len() + 1, total, &op.source, &op.target);
            restored.push(op);
        }

        for failure in outcome.failed {
            progress.item_failed(&failure.op.source, &failure.error.to_string());
            failed.push(failure);
        }
    }

    if let Err(e) = fs.remove_file(journal_path) {
        warn!("Failed to delete journal {:?}: {}", journal_path, e);
        progress.warn(&format!("Could not delete journal {}: {}", journal_path.display(), e));
    } else {
        debug!("Deleted journal {:?}", journal_path);
    }

    progress.undo_complete(restored.len(), failed.len());

    Ok(UndoReport {
        restored,
        failed,
        journal_path: journal_path.to_path_buf(),
        executed_at: journal.executed_at,
        working_directory: journal.working_directory,
    })
}

/// Split `ops` into consecutive groups whose ops share no file name.
///
/// Groups run one after another while ops inside a group run concurrently,
/// so a chain such as `c -> b` then `b -> a` keeps its order.
fn independent_waves(ops: Vec<RenameOp>) -> Vec<Vec<RenameOp>> {
    let mut waves: Vec<Vec<RenameOp>> = Vec::new();
    let mut current: Vec<RenameOp> = Vec::new();
    let mut touched: HashSet<String> = HashSet::new();

    for op in ops {
        if touched.contains(&op.source) || touched.contains(&op.target) {
            waves.push(std::mem::take(&mut current));
            touched.clear();
        }

        touched.insert(op.source.clone());
        touched.insert(op.target.clone());
        current.push(op);
    }

    if !current.is_empty() {
        waves.push(current);
    }

    waves
}
