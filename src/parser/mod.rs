mod types;

pub use types::*;

use once_cell::sync::Lazy;
use regex::Regex;

/// Turns a file name into a structured guess.
///
/// Implementations are treated as oracles by the identity extractor: any
/// error they return only rejects the one file being parsed.
pub trait FilenameParser: Send + Sync {
    fn parse(&self, name: &str) -> Result<ParsedName, ParseError>;
}

// S04E07, s04e12, S01 E01, S01E01E02, S01E01-E02
static SEASON_EPISODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS(\d{1,3})\s?E(\d{1,4})(?:-?E\d{1,4})*(?:\D|$)").unwrap()
});

// 04x12, 3x01
static CROSS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{1,3})\b").unwrap());

static CONTAINER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mkv|mp4|avi|m4v|mov|wmv|flv|webm|mpe?g|ts|m2ts|divx|ogm)$").unwrap()
});

// Tokens that end the title portion of a release name
static TECHNICAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:\d{3,4}p|hdtv|web-?dl|webrip|bluray|blu|brrip|bdrip|dvdrip|x26[45]|h\.?26[45]|hevc|xvid|proper|repack)\b",
    )
    .unwrap()
});

static YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[]?\b(?:19|20)\d{2}\b[)\]]?").unwrap());

static SPACING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\s]+").unwrap());

/// Regex parser for the naming conventions used by release groups and
/// media managers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TorrentNameParser;

impl FilenameParser for TorrentNameParser {
    fn parse(&self, name: &str) -> Result<ParsedName, ParseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyName);
        }

        let container = CONTAINER_REGEX
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        // Strip any extension from the searchable part, video or not
        let stem = match name.rfind('.') {
            Some(idx) if idx > 0 && !name[idx + 1..].contains(' ') => &name[..idx],
            _ => name,
        };

        // Underscores separate words; same byte offsets as `stem`
        let searchable = stem.replace('_', " ");

        let mut title_end = stem.len();
        let mut season = None;
        let mut episode = None;

        let episode_match = SEASON_EPISODE_REGEX
            .captures(&searchable)
            .or_else(|| CROSS_REGEX.captures(&searchable));

        if let Some(captures) = episode_match {
            season = Some(parse_number(&captures[1])?);
            episode = Some(parse_number(&captures[2])?);
            if let Some(whole) = captures.get(0) {
                title_end = title_end.min(whole.start());
            }
        }

        if let Some(m) = TECHNICAL_REGEX.find(&searchable) {
            title_end = title_end.min(m.start());
        }

        if let Some(m) = YEAR_REGEX.find(&searchable) {
            // A leading year is more likely part of the title ("1883")
            if m.start() > 0 {
                title_end = title_end.min(m.start());
            }
        }

        let title = SPACING_REGEX
            .replace_all(&stem[..title_end], " ")
            .trim()
            .to_string();

        Ok(ParsedName {
            title,
            season,
            episode,
            container,
        })
    }
}

fn parse_number(digits: &str) -> Result<u32, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::NumberOutOfRange(digits.to_string()))
}
