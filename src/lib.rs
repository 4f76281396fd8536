pub mod api;
pub mod cli;
pub mod enrich;
pub mod error;
pub mod fs;
pub mod identity;
pub mod journal;
pub mod logging;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod rename;
pub mod scanner;
pub mod scatter;
pub mod undo;

pub use error::{AppError, ExitCode};
pub use pipeline::{Pipeline, PipelineConfig, RunMode, RunReport};
pub use rename::RenameOp;
