use thiserror::Error;

/// What the heuristic parser could read out of a release-style file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    /// Text before the first technical token, dots and underscores as spaces
    pub title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Video container extension, as written in the name
    pub container: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("File name is empty")]
    EmptyName,

    #[error("Number out of range in file name: {0}")]
    NumberOutOfRange(String),
}
