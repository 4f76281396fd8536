use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::DEFAULT_LOOKUP_CONCURRENCY;
use crate::rename::DEFAULT_TEMPLATE;

#[derive(Parser, Debug)]
#[command(name = "telenamer")]
#[command(author, version, long_about = None)]
#[command(about = "Rename TV episode files using TheTVDB metadata and a naming template")]
#[command(after_help = "Template tokens:\n  \
    {s}   series name\n  \
    {n}   episode title\n  \
    {e}   episode number      {0e}  zero-padded to two digits\n  \
    {z}   season number       {0z}  zero-padded to two digits")]
pub struct Args {
    /// Directory containing the episode files
    #[arg(default_value = ".")]
    pub target_dir: PathBuf,

    /// Naming template for renamed files
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Series name to use instead of the one guessed from each file name
    #[arg(short, long)]
    pub series: Option<String>,

    /// Rename without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    pub automated: bool,

    /// Show planned renames without modifying the filesystem
    #[arg(short, long, conflicts_with = "undo")]
    pub dry: bool,

    /// Undo the renames recorded in the journal
    #[arg(short, long)]
    pub undo: bool,

    /// Journal file recording the last run's renames
    #[arg(long, value_name = "FILE")]
    pub journal: Option<PathBuf>,

    /// TheTVDB login.json credentials file
    #[arg(long, value_name = "FILE")]
    pub login: Option<PathBuf>,

    /// Concurrent lookups while waiting for confirmation
    #[arg(short, long, default_value_t = DEFAULT_LOOKUP_CONCURRENCY)]
    pub jobs: usize,

    /// Maximum file name length in bytes
    #[arg(short = 'l', long, default_value = "255")]
    pub max_length: usize,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
