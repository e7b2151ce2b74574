//! Failure kinds for the decoding stages.
//!
//! Every decode stage returns a [`DecodeError`] so callers can tell
//! "field absent" from "format unsupported" from "corrupt". The public
//! [`load`][crate::SourceDocument::load] surface downgrades all of these
//! to an empty record plus a log entry, except
//! [`InvalidCoordinateFormat`][DecodeError::InvalidCoordinateFormat]
//! which is a caller-visible bug surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-layout read ran past the end of the buffer.
    #[error("truncated record: need {need} bytes at offset {offset:#x}, have {have}")]
    TruncatedRecord {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("struct decode failed: {0}")]
    StructDecodeFailure(String),

    /// A DMS tuple had neither 3 plain nor 6 rational elements.
    #[error("invalid coordinate format: expected 3 or 6 elements, got {0}")]
    InvalidCoordinateFormat(usize),

    /// A `"N/D"` style value could not be evaluated.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl DecodeError {
    /// Maps `io::ErrorKind::NotFound` onto the dedicated variant so the
    /// dispatcher can report missing files distinctly.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DecodeError::FileNotFound(path.display().to_string())
        } else {
            DecodeError::Io(err)
        }
    }
}
