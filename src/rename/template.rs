use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::warn;

use super::types::RenameOp;
use crate::enrich::EnrichedIdentity;

pub const DEFAULT_TEMPLATE: &str = "{s} - S{0z}E{0e} - {n}";

/// Characters that are not allowed in file names on common platforms
const FORBIDDEN_CHARS: &[char] = &['?', '\\', '/', '*', ':', '"', '<', '>', '|'];

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(s|n|0?e|0?z)\}").unwrap());

/// Configuration for name building
#[derive(Debug, Clone)]
pub struct NameBuilderConfig {
    /// Maximum length of the whole file name in bytes
    pub max_length: usize,
}

impl Default for NameBuilderConfig {
    fn default() -> Self {
        Self { max_length: 255 }
    }
}

/// Substitute placeholders in `template` with values from `identity`.
///
/// Plain text replacement: `{s}` series, `{n}` episode title, `{e}`/`{0e}`
/// episode, `{z}`/`{0z}` season. Anything else is kept as written.
/// Substituted values are never expanded again.
pub fn expand_template(template: &str, identity: &EnrichedIdentity) -> String {
    TOKEN_REGEX
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "s" => identity.series.clone(),
            "n" => identity.episode_title.clone(),
            "e" => identity.episode.to_string(),
            "0e" => format!("{:02}", identity.episode),
            "z" => identity.season.to_string(),
            "0z" => format!("{:02}", identity.season),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Strip characters not allowed in file names and surrounding whitespace
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Compute the rename for one enriched identity. Pure; cannot fail.
pub fn build_rename(
    identity: &EnrichedIdentity,
    template: &str,
    config: &NameBuilderConfig,
) -> RenameOp {
    let mut stem = sanitize_file_name(&expand_template(template, identity));
    if stem.is_empty() {
        warn!(
            "Template '{}' gives an empty name for '{}', keeping the original",
            template, identity.file_name
        );
        stem = original_stem(&identity.file_name);
    }
    let suffix = format!(".{}", identity.container);

    let target = if stem.len() + suffix.len() > config.max_length {
        let room = config.max_length.saturating_sub(suffix.len());
        let short = truncate_on_char_boundary(&stem, room).trim_end();
        warn!(
            "Name for '{}' exceeds {} bytes, truncated",
            identity.file_name, config.max_length
        );
        format!("{}{}", short, suffix)
    } else {
        format!("{}{}", stem, suffix)
    };

    RenameOp::new(identity.file_name.clone(), target)
}

fn original_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string()
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(
        series: &str,
        season: u32,
        episode: u32,
        title: &str,
        container: &str,
    ) -> EnrichedIdentity {
        EnrichedIdentity {
            file_name: "original.mkv".to_string(),
            container: container.to_string(),
            season,
            episode,
            episode_title: title.to_string(),
            series: series.to_string(),
        }
    }

    #[test]
    fn test_default_template() {
        let info = identity("The Good Place", 5, 1, "Backstreet's Back", "mp4");

        let op = build_rename(&info, DEFAULT_TEMPLATE, &NameBuilderConfig::default());

        assert_eq!(op.source, "original.mkv");
        assert_eq!(op.target, "The Good Place - S05E01 - Backstreet's Back.mp4");
    }

    #[test]
    fn test_forbidden_chars_stripped_from_name_only() {
        let info = identity("The Good Place", 3, 11, "Chidi Sees the Time-Knife?", "mkv");

        let op = build_rename(&info, DEFAULT_TEMPLATE, &NameBuilderConfig::default());

        assert_eq!(op.target, "The Good Place - S03E11 - Chidi Sees the Time-Knife.mkv");
        assert_eq!(info.episode_title, "Chidi Sees the Time-Knife?");
    }

    #[test]
    fn test_raw_and_padded_tokens() {
        let info = identity("Lost", 1, 5, "White Rabbit", "avi");

        assert_eq!(expand_template("{z}x{e}", &info), "1x5");
        assert_eq!(expand_template("{0z}x{0e}", &info), "01x05");
        assert_eq!(expand_template("{s} {0z}{0e}", &info), "Lost 0105");
    }

    #[test]
    fn test_wide_numbers_not_truncated() {
        let info = identity("The Simpsons", 26, 105, "X", "mkv");
        assert_eq!(expand_template("S{0z}E{0e}", &info), "S26E105");
    }

    #[test]
    fn test_unknown_text_passes_through() {
        let info = identity("Lost", 1, 5, "White Rabbit", "avi");
        assert_eq!(expand_template("[{x}] {s}", &info), "[{x}] Lost");
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let info = identity("The Good Place", 1, 2, "Episode {e} of {s}", "mkv");

        let op = build_rename(&info, "{n}", &NameBuilderConfig::default());

        assert_eq!(op.target, "Episode {e} of {s}.mkv");
        assert_eq!(expand_template("{s} {0z}", &identity("{0z}", 3, 1, "", "mkv")), "{0z} 03");
    }

    #[test]
    fn test_empty_name_keeps_original_stem() {
        let info = identity("Show", 1, 1, "???", "mkv");

        let op = build_rename(&info, "{n}", &NameBuilderConfig::default());

        assert_eq!(op.target, "original.mkv");
        assert!(op.is_noop());
    }

    #[test]
    fn test_build_is_idempotent() {
        let info = identity("The Good Place", 5, 1, "Backstreet's Back", "mp4");
        let config = NameBuilderConfig::default();

        let first = build_rename(&info, DEFAULT_TEMPLATE, &config);
        let second = build_rename(&info, DEFAULT_TEMPLATE, &config);

        assert_eq!(first, second);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(r#"a/b\c:d*e?f"g<h>i|j"#), "abcdefghij");
        assert_eq!(sanitize_file_name("  padded\t"), "padded");
        assert_eq!(sanitize_file_name("tab\tinside"), "tabinside");
    }

    #[test]
    fn test_series_slash_is_stripped() {
        let info = identity("AC/DC Live", 1, 1, "Thunder", "mkv");

        let op = build_rename(&info, "{s} {0e}", &NameBuilderConfig::default());

        assert_eq!(op.target, "ACDC Live 01.mkv");
    }

    #[test]
    fn test_truncates_long_names_keeping_extension() {
        let title = "x".repeat(300);
        let info = identity("Show", 1, 1, &title, "mkv");

        let op = build_rename(&info, "{n}", &NameBuilderConfig { max_length: 20 });

        assert_eq!(op.target.len(), 20);
        assert!(op.target.ends_with(".mkv"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let info = identity("Show", 1, 1, "ééééééééééé", "mkv");

        let op = build_rename(&info, "{n}", &NameBuilderConfig { max_length: 10 });

        assert!(op.target.len() <= 10);
        assert_eq!(op.target, "ééé.mkv");
    }
}
