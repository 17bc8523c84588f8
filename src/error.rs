//! Error types for piece table edits.

use std::fmt;

/// Result type alias for fallible edits.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by an edit the document cannot apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A range whose start lies after its end.
    OutOfRange { start: usize, end: usize, len: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { start, end, len } => {
                write!(f, "range {start}..{end} is malformed for document of length {len}")
            }
        }
    }
}

impl std::error::Error for Error {}
