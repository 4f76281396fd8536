//! Pipeline orchestration: infer, enrich, template, rename, journal.
//!
//! Automated runs push every file through its own task from lookup to
//! rename. Interactive runs only parallelise the lookups; confirmation and
//! renaming happen one file at a time in input order.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{Credentials, MetadataProvider};
use crate::enrich::{enrich, EnrichError, EnrichedIdentity};
use crate::fs::FileSystem;
use crate::identity::{infer_identities, RawIdentity};
use crate::journal::{default_journal_path, write_journal, Journal, JournalError};
use crate::parser::FilenameParser;
use crate::progress::Progress;
use crate::prompt::Confirmer;
use crate::rename::{
    apply_claimed, build_rename, NameBuilderConfig, RenameError, RenameFailure, RenameOp,
    TargetClaims, DEFAULT_TEMPLATE,
};
use crate::scatter::{scatter_gather, Ordering, ScatterOptions};

pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Rename everything without asking, as fast as possible
    Automated,
    /// Ask before every rename, in input order
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Inferring,
    Automated,
    Interactive,
    Journaling,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Inferring => "inferring",
            PipelineState::Automated => "automated",
            PipelineState::Interactive => "interactive",
            PipelineState::Journaling => "journaling",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

fn transition(from: PipelineState, to: PipelineState) -> PipelineState {
    debug!("Pipeline state: {} -> {}", from, to);
    to
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub working_dir: PathBuf,
    pub template: String,
    /// Series name used instead of the one inferred from each file name
    pub series: Option<String>,
    pub journal_path: PathBuf,
    /// Concurrent lookups while planning or waiting on confirmation
    pub lookup_concurrency: usize,
    pub names: NameBuilderConfig,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            series: None,
            journal_path: default_journal_path(),
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            names: NameBuilderConfig::default(),
            dry_run: false,
        }
    }
}

/// Why one file was not renamed
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Enrich(#[from] EnrichError),

    #[error(transparent)]
    Rename(#[from] RenameError),

    #[error("Task ended without reporting a result")]
    Lost,
}

#[derive(Debug)]
pub struct ItemFailure {
    pub file_name: String,
    pub error: ItemError,
}

impl From<RenameFailure> for ItemFailure {
    fn from(failure: RenameFailure) -> Self {
        Self {
            file_name: failure.op.source,
            error: ItemError::Rename(failure.error),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub mode: RunMode,
    pub dry_run: bool,
    /// Renames computed for a dry run, in input order
    pub planned: Vec<RenameOp>,
    /// Renames committed to disk, in the order they happened
    pub renamed: Vec<RenameOp>,
    /// Renames the operator declined
    pub skipped: Vec<RenameOp>,
    pub failures: Vec<ItemFailure>,
    /// Files that were not recognised as episodes
    pub ignored: usize,
    /// Where the journal was written; `None` for dry runs
    pub journal_path: Option<PathBuf>,
}

impl RunReport {
    fn new(mode: RunMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            planned: Vec::new(),
            renamed: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            ignored: 0,
            journal_path: None,
        }
    }
}

type Lookup = (String, Result<EnrichedIdentity, ItemError>);

pub struct Pipeline {
    parser: Arc<dyn FilenameParser>,
    provider: Arc<dyn MetadataProvider>,
    fs: Arc<dyn FileSystem>,
    credentials: Arc<Credentials>,
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn new(
        parser: Arc<dyn FilenameParser>,
        provider: Arc<dyn MetadataProvider>,
        fs: Arc<dyn FileSystem>,
        credentials: Credentials,
        config: PipelineConfig,
    ) -> Self {
        Self {
            parser,
            provider,
            fs,
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }

    /// Process `files` (bare names inside the working directory).
    ///
    /// Per-file failures end up in the report. The only error returned is a
    /// journal that could not be written.
    pub async fn run(
        &self,
        files: Vec<String>,
        mode: RunMode,
        confirmer: &mut dyn Confirmer,
        progress: &mut Progress,
    ) -> Result<RunReport, JournalError> {
        let mut state = PipelineState::Init;
        let mut report = RunReport::new(mode, self.config.dry_run);
        let total = files.len();

        state = transition(state, PipelineState::Inferring);
        let ordering = if mode == RunMode::Automated && !self.config.dry_run {
            Ordering::Unordered
        } else {
            Ordering::Preserving
        };
        let identities = infer_identities(
            Arc::clone(&self.parser),
            files,
            self.config.series.clone(),
            ordering,
        )
        .await;
        report.ignored = total - identities.len();
        info!(
            "{} of {} file(s) look like episodes",
            identities.len(),
            total
        );

        if self.config.dry_run {
            self.plan(identities, &mut report, progress).await;
            transition(state, PipelineState::Done);
            return Ok(report);
        }

        match mode {
            RunMode::Automated => {
                state = transition(state, PipelineState::Automated);
                self.run_automated(identities, &mut report, progress).await;
            }
            RunMode::Interactive => {
                state = transition(state, PipelineState::Interactive);
                self.run_interactive(identities, &mut report, confirmer, progress)
                    .await;
            }
        }

        state = transition(state, PipelineState::Journaling);
        let journal = Journal::new(&self.config.working_dir, report.renamed.clone());
        write_journal(self.fs.as_ref(), &self.config.journal_path, &journal)?;
        progress.journal_written(&self.config.journal_path);
        report.journal_path = Some(self.config.journal_path.clone());

        transition(state, PipelineState::Done);
        Ok(report)
    }

    /// Compute renames in input order without touching the filesystem
    async fn plan(
        &self,
        identities: Vec<RawIdentity>,
        report: &mut RunReport,
        progress: &mut Progress,
    ) {
        progress.lookup_start(identities.len());
        let lookups = self.lookup_in_order(identities).await;
        progress.lookup_complete();

        let claims = TargetClaims::new();
        for (file_name, lookup) in lookups {
            let result = lookup
                .map(|enriched| {
                    build_rename(&enriched, &self.config.template, &self.config.names)
                })
                .and_then(|op| claims.claim(&op).map(|_| op).map_err(ItemError::from));

            match result {
                Ok(op) => report.planned.push(op),
                Err(error) => record_failure(report, progress, file_name, error),
            }
        }
    }

    /// One task per file: enrich, template, rename
    async fn run_automated(
        &self,
        identities: Vec<RawIdentity>,
        report: &mut RunReport,
        progress: &mut Progress,
    ) {
        let expected: Vec<String> = identities.iter().map(|i| i.file_name.clone()).collect();
        let claims = Arc::new(TargetClaims::new());

        let results = scatter_gather(identities, ScatterOptions::unordered(), |raw| {
            let provider = Arc::clone(&self.provider);
            let credentials = Arc::clone(&self.credentials);
            let config = Arc::clone(&self.config);
            let fs = Arc::clone(&self.fs);
            let claims = Arc::clone(&claims);

            async move {
                let enriched = match enrich(provider.as_ref(), &credentials, &raw).await {
                    Ok(enriched) => enriched,
                    Err(e) => {
                        return Err(ItemFailure {
                            file_name: raw.file_name,
                            error: e.into(),
                        })
                    }
                };
                let op = build_rename(&enriched, &config.template, &config.names);
                apply_claimed(fs, config.working_dir.clone(), claims, op)
                    .await
                    .map_err(ItemFailure::from)
            }
        })
        .await;

        let total = expected.len();
        let mut reported: HashSet<String> = HashSet::with_capacity(total);

        for result in results {
            match result {
                Ok(op) => {
                    reported.insert(op.source.clone());
                    let current = report.renamed.len() + 1;
                    progress.rename_progress(current, total, &op.source, &op.target);
                    report.renamed.push(op);
                }
                Err(failure) => {
                    reported.insert(failure.file_name.clone());
                    record_failure(report, progress, failure.file_name, failure.error);
                }
            }
        }

        // Every file must be accounted for before the batch counts as done
        for file_name in expected {
            if !reported.contains(&file_name) {
                record_failure(report, progress, file_name, ItemError::Lost);
            }
        }
    }

    /// Enrich concurrently, then confirm and rename one by one in order
    async fn run_interactive(
        &self,
        identities: Vec<RawIdentity>,
        report: &mut RunReport,
        confirmer: &mut dyn Confirmer,
        progress: &mut Progress,
    ) {
        let total = identities.len();
        progress.lookup_start(total);
        let lookups = self.lookup_in_order(identities).await;
        progress.lookup_complete();

        let claims = Arc::new(TargetClaims::new());

        for (file_name, lookup) in lookups {
            let enriched = match lookup {
                Ok(enriched) => enriched,
                Err(error) => {
                    record_failure(report, progress, file_name, error);
                    continue;
                }
            };

            let op = build_rename(&enriched, &self.config.template, &self.config.names);

            if !confirmer.confirm(&op) {
                info!("Skipped: {}", op.source);
                report.skipped.push(op);
                continue;
            }

            let applied = apply_claimed(
                Arc::clone(&self.fs),
                self.config.working_dir.clone(),
                Arc::clone(&claims),
                op,
            )
            .await;

            match applied {
                Ok(op) => {
                    let current = report.renamed.len() + 1;
                    progress.rename_progress(current, total, &op.source, &op.target);
                    report.renamed.push(op);
                }
                Err(failure) => {
                    let failure = ItemFailure::from(failure);
                    record_failure(report, progress, failure.file_name, failure.error);
                }
            }
        }
    }

    /// Enrich every identity with bounded concurrency, keeping input order.
    ///
    /// Files whose task produced nothing come last, as [`ItemError::Lost`].
    async fn lookup_in_order(&self, identities: Vec<RawIdentity>) -> Vec<Lookup> {
        let expected: Vec<String> = identities.iter().map(|i| i.file_name.clone()).collect();
        let options =
            ScatterOptions::preserving().with_max_concurrency(self.config.lookup_concurrency);

        let mut lookups = scatter_gather(identities, options, |raw| {
            let provider = Arc::clone(&self.provider);
            let credentials = Arc::clone(&self.credentials);
            async move {
                let result = enrich(provider.as_ref(), &credentials, &raw).await;
                (raw.file_name, result.map_err(ItemError::from))
            }
        })
        .await;

        if lookups.len() < expected.len() {
            let seen: HashSet<String> = lookups.iter().map(|(name, _)| name.clone()).collect();
            for name in expected.into_iter().filter(|name| !seen.contains(name)) {
                lookups.push((name, Err(ItemError::Lost)));
            }
        }

        lookups
    }
}

fn record_failure(
    report: &mut RunReport,
    progress: &mut Progress,
    file_name: String,
    error: ItemError,
) {
    warn!("Not renaming '{}': {}", file_name, error);
    progress.item_failed(&file_name, &error.to_string());
    report.failures.push(ItemFailure { file_name, error });
}
