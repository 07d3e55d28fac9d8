//! Error types for volcar.

use std::path::PathBuf;

/// Result type alias for volcar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in volcar operations.
///
/// All variants describe either column compilation failures (reported when an
/// [`Extractor`](crate::Extractor) is built) or adapter output failures.
/// Row-level absence — a nil pointer or a failed accessor during extraction —
/// is not an error; it collapses to an absent cell instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The column specification was empty.
    #[error("empty column specification")]
    EmptySpec,

    /// The column specification contained an empty segment (`"a..b"`).
    #[error("empty segment in column specification '{spec}'")]
    EmptySegment {
        /// The offending specification string.
        spec: String,
    },

    /// A segment named neither a field nor an accessor of the current type.
    #[error("no field or accessor '{segment}' in {type_name}")]
    UnknownSegment {
        /// The unresolvable segment.
        segment: String,
        /// The type the segment was resolved against.
        type_name: &'static str,
    },

    /// The collection's element type is not a record type.
    #[error("cannot extract from elements of type {type_name}")]
    NotARecord {
        /// The rejected element type.
        type_name: &'static str,
    },

    /// An intermediate segment resolved to a type with no members to
    /// descend into.
    #[error("cannot resolve '{segment}': {type_name} is not a record type")]
    IntermediateNotRecord {
        /// The segment that could not be resolved.
        segment: String,
        /// The memberless type it was resolved against.
        type_name: &'static str,
    },

    /// The final segment resolved to a type with no semantic value kind and
    /// no text conversion.
    #[error("cannot use '{segment}' of type {type_name} as final element")]
    UnsupportedTerminal {
        /// The final segment.
        segment: String,
        /// Its unusable type.
        type_name: &'static str,
    },

    /// CSV error while dumping.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while dumping.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create an empty-segment error.
    pub fn empty_segment(spec: impl Into<String>) -> Self {
        Self::EmptySegment { spec: spec.into() }
    }

    /// Create an unknown-segment error.
    pub fn unknown_segment(segment: impl Into<String>, type_name: &'static str) -> Self {
        Self::UnknownSegment {
            segment: segment.into(),
            type_name,
        }
    }

    /// Create a not-a-record error.
    #[must_use]
    pub fn not_a_record(type_name: &'static str) -> Self {
        Self::NotARecord { type_name }
    }

    /// Create an intermediate-not-record error.
    pub fn intermediate_not_record(segment: impl Into<String>, type_name: &'static str) -> Self {
        Self::IntermediateNotRecord {
            segment: segment.into(),
            type_name,
        }
    }

    /// Create an unsupported-terminal error.
    pub fn unsupported_terminal(segment: impl Into<String>, type_name: &'static str) -> Self {
        Self::UnsupportedTerminal {
            segment: segment.into(),
            type_name,
        }
    }
}
