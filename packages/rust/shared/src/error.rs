//! Error types for QuizSheet.
//!
//! Library crates use [`QuizSheetError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all QuizSheet operations.
#[derive(Debug, thiserror::Error)]
pub enum QuizSheetError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A sheet value could not be parsed into its domain type.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Spreadsheet backend failure (calamine, xlsxwriter, csv).
    #[error("table error: {0}")]
    Table(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A column the stage depends on is not in the header row.
    #[error("required column '{column}' not found in table header")]
    MissingColumn { column: String },

    /// No tabular backend is registered for this file extension.
    #[error("unsupported table format: {path:?}")]
    UnsupportedFormat { path: PathBuf },

    /// Data validation error (bad settings, malformed table shape, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuizSheetError>;

impl QuizSheetError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a missing-column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = QuizSheetError::config("unknown output format 'ods'");
        assert_eq!(err.to_string(), "config error: unknown output format 'ods'");

        let err = QuizSheetError::missing_column("Question No");
        assert!(err.to_string().contains("'Question No'"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = QuizSheetError::io("answers.md", source);
        assert!(err.to_string().contains("answers.md"));
        assert!(matches!(err, QuizSheetError::Io { .. }));
    }
}
