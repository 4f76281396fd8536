use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Subtitle,
}

/// Local guess at which episode a file holds, read from its name only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIdentity {
    pub file_name: String,
    /// Extension the renamed file keeps, as written in the original name
    pub container: String,
    pub season: u32,
    pub episode: u32,
    pub series: String,
    pub kind: MediaKind,
}

/// Why a file was left out of the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The filename parser itself gave up
    Unparsable(String),
    /// Neither a video container nor a subtitle extension
    NotMedia,
    /// No season/episode numbering in the name
    NoEpisode,
    /// No series override and nothing usable before the episode token
    NoSeries,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unparsable(reason) => write!(f, "unparsable: {}", reason),
            Rejection::NotMedia => write!(f, "not a video or subtitle file"),
            Rejection::NoEpisode => write!(f, "no season/episode number"),
            Rejection::NoSeries => write!(f, "no series name"),
        }
    }
}

/// Outcome of identity extraction for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Valid(RawIdentity),
    Rejected { file_name: String, reason: Rejection },
}

impl Extraction {
    pub fn file_name(&self) -> &str {
        match self {
            Extraction::Valid(identity) => &identity.file_name,
            Extraction::Rejected { file_name, .. } => file_name,
        }
    }

    pub fn into_valid(self) -> Option<RawIdentity> {
        match self {
            Extraction::Valid(identity) => Some(identity),
            Extraction::Rejected { .. } => None,
        }
    }
}
