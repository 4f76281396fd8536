use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info};

use telenamer::api::{resolve_credentials, ApiConfig, TvdbClient};
use telenamer::cli::Args;
use telenamer::error::AppError;
use telenamer::fs::{FileSystem, OsFileSystem};
use telenamer::journal::default_journal_path;
use telenamer::logging;
use telenamer::output::{display_dry_run, display_run_result, display_undo_result};
use telenamer::parser::TorrentNameParser;
use telenamer::pipeline::{Pipeline, PipelineConfig, RunMode};
use telenamer::progress::{should_use_colors, Progress};
use telenamer::prompt::{AlwaysConfirm, PromptConfirmer};
use telenamer::rename::NameBuilderConfig;
use telenamer::scanner::scan_directory;
use telenamer::undo::undo;

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut progress = Progress::new_with_ui(args.verbose > 0, should_use_colors());
    let fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem);
    let journal_path = args.journal.clone().unwrap_or_else(default_journal_path);

    if args.undo {
        info!("Undo mode: {:?}", journal_path);
        let report = undo(fs, &journal_path, &mut progress).await?;
        display_undo_result(&report, &mut io::stdout()).map_err(display_error)?;
        return Ok(());
    }

    if args.jobs == 0 {
        return Err(AppError::InvalidArguments(
            "--jobs must be at least 1".to_string(),
        ));
    }

    let files = scan_directory(fs.as_ref(), &args.target_dir)?;
    progress.scan_complete(&args.target_dir, files.len());
    info!("Found {} files", files.len());
    for file in &files {
        debug!("  {}", file);
    }

    // The journal must point at the directory no matter where undo runs from
    let working_dir = std::fs::canonicalize(&args.target_dir).unwrap_or(args.target_dir);

    let credentials = resolve_credentials(args.login.as_deref())?;
    debug!("Credentials loaded, language: {}", credentials.language);
    let provider = TvdbClient::new(ApiConfig::default())?;

    let config = PipelineConfig {
        working_dir,
        template: args.template,
        series: args.series,
        journal_path,
        lookup_concurrency: args.jobs,
        names: NameBuilderConfig {
            max_length: args.max_length,
        },
        dry_run: args.dry,
    };

    let pipeline = Pipeline::new(
        Arc::new(TorrentNameParser),
        Arc::new(provider),
        fs,
        credentials,
        config,
    );

    let report = if args.automated || args.dry {
        pipeline
            .run(files, RunMode::Automated, &mut AlwaysConfirm, &mut progress)
            .await?
    } else {
        let mut confirmer = PromptConfirmer::stdin();
        pipeline
            .run(files, RunMode::Interactive, &mut confirmer, &mut progress)
            .await?
    };

    if report.dry_run {
        display_dry_run(&report, &mut io::stdout()).map_err(display_error)?;
    } else {
        display_run_result(&report, &mut io::stdout()).map_err(display_error)?;
    }

    Ok(())
}

fn display_error(e: io::Error) -> AppError {
    AppError::Other(format!("Failed to display output: {}", e))
}
