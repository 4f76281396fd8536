mod executor;
mod template;
mod types;

pub use executor::{apply_claimed, rename_files, BatchOutcome, RenameFailure, TargetClaims};
pub use template::{
    build_rename, expand_template, sanitize_file_name, NameBuilderConfig, DEFAULT_TEMPLATE,
};
pub use types::{RenameError, RenameOp};
