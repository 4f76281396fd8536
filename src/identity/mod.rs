mod batch;
mod types;

pub use batch::infer_identities;
pub use types::*;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, trace};

use crate::parser::FilenameParser;

pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "ssa", "vtt", "idx", "smi"];

// " - ", "|", ":", "[", "]" and runs of them, with the spaces around them
static SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*[-|:\[\]]\s*)+").unwrap());

/// Replace separator noise with single spaces.
pub fn strip_separators(name: &str) -> String {
    SEPARATOR_REGEX.replace_all(name, " ").trim().to_string()
}

/// Subtitle extension of `file_name`, as written, if it has one.
pub fn subtitle_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    SUBTITLE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
        .then(|| extension.to_string())
}

/// Work out series, season and episode for one file name.
///
/// `series` overrides whatever title the parser infers. Parser failures
/// reject the file instead of propagating.
pub fn extract_identity(
    parser: &dyn FilenameParser,
    file_name: &str,
    series: Option<&str>,
) -> Extraction {
    let reject = |reason: Rejection| {
        debug!(file = %file_name, %reason, "Rejected file");
        Extraction::Rejected {
            file_name: file_name.to_string(),
            reason,
        }
    };

    let cleaned = strip_separators(file_name);
    trace!(file = %file_name, cleaned = %cleaned, "Cleaned file name");

    let parsed = match parser.parse(&cleaned) {
        Ok(parsed) => parsed,
        Err(e) => return reject(Rejection::Unparsable(e.to_string())),
    };

    let (kind, container) = match parsed.container {
        Some(container) => (MediaKind::Video, container),
        None => match subtitle_extension(file_name) {
            Some(extension) => (MediaKind::Subtitle, extension),
            None => return reject(Rejection::NotMedia),
        },
    };

    let (Some(season), Some(episode)) = (parsed.season, parsed.episode) else {
        return reject(Rejection::NoEpisode);
    };

    let series = match series.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.to_string(),
        None => strip_separators(&parsed.title),
    };

    if series.is_empty() {
        return reject(Rejection::NoSeries);
    }

    Extraction::Valid(RawIdentity {
        file_name: file_name.to_string(),
        container,
        season,
        episode,
        series,
        kind,
    })
}
