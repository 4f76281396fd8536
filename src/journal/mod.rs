mod reader;
mod types;
mod writer;

pub use reader::read_journal;
pub use types::*;
pub use writer::{write_journal, JournalError};
