use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use telenamer::api::{ApiError, Credentials, EpisodeRecord, MetadataProvider, SeriesRecord, Session};
use telenamer::enrich::EnrichError;
use telenamer::fs::{FileSystem, MemoryFileSystem};
use telenamer::journal::{read_journal, JournalError};
use telenamer::parser::TorrentNameParser;
use telenamer::pipeline::{ItemError, Pipeline, PipelineConfig, RunMode};
use telenamer::progress::Progress;
use telenamer::prompt::{AlwaysConfirm, Confirmer};
use telenamer::rename::{RenameError, RenameOp};
use telenamer::undo::undo;

const DIR: &str = "/tv";
const JOURNAL: &str = "/tmp/telenamer-journal.json";

struct FakeSeries {
    id: u64,
    name: &'static str,
    search_delay_ms: u64,
    episodes: Vec<(u32, u32, &'static str)>,
}

#[derive(Default)]
struct FakeProvider {
    /// Lower-cased search query -> series
    series: HashMap<String, FakeSeries>,
    reject_login: bool,
}

impl FakeProvider {
    fn with_series(mut self, query: &str, series: FakeSeries) -> Self {
        self.series.insert(query.to_lowercase(), series);
        self
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        if self.reject_login || credentials.api_key.is_empty() {
            return Err(ApiError::Unauthorized("Not Authorized".into()));
        }
        Ok(Session {
            token: "token".into(),
            language: credentials.language.clone(),
        })
    }

    async fn search_series(
        &self,
        _session: &Session,
        name: &str,
    ) -> Result<Vec<SeriesRecord>, ApiError> {
        match self.series.get(&name.to_lowercase()) {
            Some(series) => {
                tokio::time::sleep(Duration::from_millis(series.search_delay_ms)).await;
                Ok(vec![SeriesRecord {
                    id: series.id,
                    name: series.name.to_string(),
                }])
            }
            None => Ok(vec![]),
        }
    }

    async fn series_episodes(
        &self,
        _session: &Session,
        series_id: u64,
    ) -> Result<Vec<EpisodeRecord>, ApiError> {
        let series = self
            .series
            .values()
            .find(|s| s.id == series_id)
            .ok_or_else(|| ApiError::NotFound(series_id.to_string()))?;

        Ok(series
            .episodes
            .iter()
            .map(|(season, episode, title)| EpisodeRecord {
                season: *season,
                episode: *episode,
                title: title.to_string(),
            })
            .collect())
    }
}

/// Confirmer answering from a script and remembering what it was shown
struct ScriptedConfirmer {
    answers: Vec<bool>,
    shown: Vec<RenameOp>,
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, op: &RenameOp) -> bool {
        let answer = self.answers.get(self.shown.len()).copied().unwrap_or(false);
        self.shown.push(op.clone());
        answer
    }
}

fn good_place() -> FakeSeries {
    FakeSeries {
        id: 311711,
        name: "The Good Place",
        search_delay_ms: 0,
        episodes: vec![
            (1, 1, "Everything Is Fine"),
            (1, 3, "Tahani Al-Jamil"),
            (5, 1, "Backstreet's Back"),
        ],
    }
}

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn pipeline(provider: FakeProvider, memfs: Arc<MemoryFileSystem>, dry_run: bool) -> Pipeline {
    let mut config = PipelineConfig::new(DIR);
    config.journal_path = PathBuf::from(JOURNAL);
    config.dry_run = dry_run;

    Pipeline::new(
        Arc::new(TorrentNameParser),
        Arc::new(provider),
        memfs,
        Credentials::new("KEY", "UKEY", "someone"),
        config,
    )
}

#[tokio::test]
async fn test_automated_partial_failure_journals_only_successes() {
    let dir = Path::new(DIR);
    let names = [
        "the.good.place.s01e01.mkv",
        "the.good.place.s01e02.mkv",
        "the.good.place.s01e03.mkv",
    ];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert_eq!(report.renamed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file_name, "the.good.place.s01e02.mkv");
    assert!(matches!(
        report.failures[0].error,
        ItemError::Enrich(EnrichError::EpisodeNotFound { season: 1, episode: 2, .. })
    ));

    assert_eq!(
        memfs.file_names(dir),
        vec![
            "The Good Place - S01E01 - Everything Is Fine.mkv",
            "The Good Place - S01E03 - Tahani Al-Jamil.mkv",
            "the.good.place.s01e02.mkv",
        ]
    );

    let journal = read_journal(memfs.as_ref(), Path::new(JOURNAL)).unwrap();
    let mut sources: Vec<&str> = journal.changes.iter().map(|op| op.source.as_str()).collect();
    sources.sort();
    assert_eq!(sources, vec!["the.good.place.s01e01.mkv", "the.good.place.s01e03.mkv"]);
    assert_eq!(journal.working_directory, dir);
}

#[tokio::test]
async fn test_interactive_presents_in_input_order() {
    let dir = Path::new(DIR);
    let names = ["Alpha S01E01.mkv", "Beta S01E01.mkv", "Gamma S01E01.mkv"];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));

    let series = |id, name, delay| FakeSeries {
        id,
        name,
        search_delay_ms: delay,
        episodes: vec![(1, 1, "Pilot")],
    };
    // The first file's lookup finishes last
    let provider = FakeProvider::default()
        .with_series("alpha", series(1, "Alpha", 80))
        .with_series("beta", series(2, "Beta", 40))
        .with_series("gamma", series(3, "Gamma", 0));

    let mut confirmer = ScriptedConfirmer {
        answers: vec![true, false, true],
        shown: vec![],
    };

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Interactive,
            &mut confirmer,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    let shown: Vec<&str> = confirmer.shown.iter().map(|op| op.source.as_str()).collect();
    assert_eq!(shown, vec!["Alpha S01E01.mkv", "Beta S01E01.mkv", "Gamma S01E01.mkv"]);

    assert_eq!(
        report.renamed,
        vec![
            RenameOp::new("Alpha S01E01.mkv", "Alpha - S01E01 - Pilot.mkv"),
            RenameOp::new("Gamma S01E01.mkv", "Gamma - S01E01 - Pilot.mkv"),
        ]
    );
    assert_eq!(report.skipped, vec![RenameOp::new("Beta S01E01.mkv", "Beta - S01E01 - Pilot.mkv")]);

    let journal = read_journal(memfs.as_ref(), Path::new(JOURNAL)).unwrap();
    assert_eq!(journal.changes, report.renamed);
}

#[tokio::test]
async fn test_interactive_lookup_failure_skips_only_that_file() {
    let dir = Path::new(DIR);
    let names = [
        "the.good.place.s01e01.mkv",
        "the.good.place.s01e02.mkv",
        "the.good.place.s01e03.mkv",
    ];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let mut confirmer = ScriptedConfirmer {
        answers: vec![true, true],
        shown: vec![],
    };

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Interactive,
            &mut confirmer,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    let shown: Vec<&str> = confirmer
        .shown
        .iter()
        .map(|op| op.source.as_str())
        .collect();
    assert_eq!(
        shown,
        vec!["the.good.place.s01e01.mkv", "the.good.place.s01e03.mkv"]
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file_name, "the.good.place.s01e02.mkv");
    assert!(matches!(
        report.failures[0].error,
        ItemError::Enrich(EnrichError::EpisodeNotFound { season: 1, episode: 2, .. })
    ));

    assert_eq!(
        report.renamed,
        vec![
            RenameOp::new(
                "the.good.place.s01e01.mkv",
                "The Good Place - S01E01 - Everything Is Fine.mkv"
            ),
            RenameOp::new(
                "the.good.place.s01e03.mkv",
                "The Good Place - S01E03 - Tahani Al-Jamil.mkv"
            ),
        ]
    );
    assert!(memfs.exists(&dir.join("the.good.place.s01e02.mkv")));

    let journal = read_journal(memfs.as_ref(), Path::new(JOURNAL)).unwrap();
    assert_eq!(journal.changes, report.renamed);
}

#[tokio::test]
async fn test_undo_restores_automated_run() {
    let dir = Path::new(DIR);
    let names = ["The Good Place - 01x01.mkv", "the good place s01e03.srt", "notes.txt"];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert_eq!(report.renamed.len(), 2);
    assert_eq!(report.ignored, 1);
    assert!(memfs.exists(&dir.join("The Good Place - S01E03 - Tahani Al-Jamil.srt")));

    let undone = undo(memfs.clone(), Path::new(JOURNAL), &mut Progress::silent())
        .await
        .unwrap();

    assert_eq!(undone.restored.len(), 2);
    let mut expected = files(&names);
    expected.sort();
    assert_eq!(memfs.file_names(dir), expected);
    assert!(!memfs.exists(Path::new(JOURNAL)));
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let dir = Path::new(DIR);
    let names = ["Lost 1x05.avi", "The Good Place S05E01.mp4"];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let report = pipeline(provider, memfs.clone(), true)
        .run(
            files(&names),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(
        report.planned,
        vec![RenameOp::new(
            "The Good Place S05E01.mp4",
            "The Good Place - S05E01 - Backstreet's Back.mp4"
        )]
    );
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Enrich(EnrichError::SeriesNotFound { .. })
    ));
    assert!(report.renamed.is_empty());
    assert!(report.journal_path.is_none());

    let mut expected = files(&names);
    expected.sort();
    assert_eq!(memfs.file_names(dir), expected);
    assert!(!memfs.exists(Path::new(JOURNAL)));
}

#[tokio::test]
async fn test_colliding_targets_rename_only_one() {
    let dir = Path::new(DIR);
    let names = ["The Good Place S01E01.mkv", "the.good.place.s01e01.mkv"];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Rename(RenameError::TargetCollision(_))
    ));
    assert_eq!(memfs.file_names(dir).len(), 2);
}

#[tokio::test]
async fn test_existing_target_is_not_overwritten() {
    let dir = Path::new(DIR);
    let target = "The Good Place - S01E01 - Everything Is Fine.mkv";
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, ["tgp S01E01.mkv", target]));
    memfs.add_file(&dir.join(target), b"keep me");
    let provider = FakeProvider::default().with_series("tgp", good_place());

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&["tgp S01E01.mkv"]),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert!(report.renamed.is_empty());
    assert!(matches!(
        report.failures[0].error,
        ItemError::Rename(RenameError::TargetExists(_))
    ));
    assert_eq!(memfs.read(&dir.join(target)).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_auth_failure_fails_every_item_but_still_journals() {
    let dir = Path::new(DIR);
    let names = ["The Good Place S01E01.mkv", "The Good Place S01E03.mkv"];
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, names));
    let provider = FakeProvider {
        reject_login: true,
        ..FakeProvider::default().with_series("the good place", good_place())
    };

    let report = pipeline(provider, memfs.clone(), false)
        .run(
            files(&names),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert!(report.renamed.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.error, ItemError::Enrich(EnrichError::AuthFailed { .. }))));

    let journal = read_journal(memfs.as_ref(), Path::new(JOURNAL)).unwrap();
    assert!(journal.changes.is_empty());
}

#[tokio::test]
async fn test_journal_write_failure_is_reported() {
    let dir = Path::new(DIR);
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, ["The Good Place S05E01.mp4"]));
    memfs.deny(Path::new(JOURNAL));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let result = pipeline(provider, memfs.clone(), false)
        .run(
            files(&["The Good Place S05E01.mp4"]),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await;

    assert!(matches!(result, Err(JournalError::Write { .. })));
    assert!(memfs.exists(&dir.join("The Good Place - S05E01 - Backstreet's Back.mp4")));
}

#[tokio::test]
async fn test_series_override_and_custom_template() {
    let dir = Path::new(DIR);
    let memfs = Arc::new(MemoryFileSystem::with_files(dir, ["01x03 - Episode.mkv"]));
    let provider = FakeProvider::default().with_series("the good place", good_place());

    let mut config = PipelineConfig::new(DIR);
    config.journal_path = PathBuf::from(JOURNAL);
    config.series = Some("The Good Place".to_string());
    config.template = "{s} {z}x{0e} {n}".to_string();

    let pipeline = Pipeline::new(
        Arc::new(TorrentNameParser),
        Arc::new(provider),
        memfs.clone(),
        Credentials::new("KEY", "", ""),
        config,
    );

    let report = pipeline
        .run(
            files(&["01x03 - Episode.mkv"]),
            RunMode::Automated,
            &mut AlwaysConfirm,
            &mut Progress::silent(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.renamed,
        vec![RenameOp::new("01x03 - Episode.mkv", "The Good Place 1x03 Tahani Al-Jamil.mkv")]
    );
}
