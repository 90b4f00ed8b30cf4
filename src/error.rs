//! Error types for the record filter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while filtering a record stream.
#[derive(Error, Debug)]
pub enum SieveError {
    /// Reading the input or writing the output failed.
    #[error("I/O error while {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The predicate failed on a data line.
    #[error("predicate failed on line {line_number} ({line:?})")]
    Predicate {
        line_number: u64,
        line: String,
        #[source]
        source: EvalError,
    },

    /// Failed to parse a declarative rule.
    #[error("Rule parse error: {0}")]
    RuleParse(String),

    /// The temporary output could not be renamed over the destination.
    #[error("could not move filtered output into {}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SieveError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SieveError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Errors raised by a predicate while evaluating a single data line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The line has fewer tab-separated columns than the field needs.
    #[error("column {column} needs at least {needed} columns, line has {found}")]
    TooFewColumns {
        column: &'static str,
        needed: usize,
        found: usize,
    },

    /// The line or column a predicate needs as text is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// Attempted to access an unknown field.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Type mismatch during comparison.
    #[error("Type mismatch: cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    /// Failure reported by a user-supplied predicate.
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, SieveError>;
