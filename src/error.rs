//! Error type for infrastructure failures.
//!
//! Conversion findings (conflicts, merged values, lost comments) are not
//! errors; they are reported as [`crate::status::Diagnostic`]s. This type
//! covers what prevents the engine from running at all.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for propyaml operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a workspace resource failed
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target appeared after the conversion was checked
    #[error("'{}' already exists and is not overwritten", .0.display())]
    TargetExists(PathBuf),

    /// The YAML input is not well formed
    #[error("YAML syntax error: {0}")]
    YamlScan(#[from] yaml_rust2::ScanError),

    /// The properties input is not well formed
    #[error("properties syntax error on line {line}: {message}")]
    PropertiesSyntax { line: usize, message: String },

    /// An orchestrator step was called out of order
    #[error("conversion is in state {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// A change was requested although the status is FATAL
    #[error("conversion refused: {0}")]
    Fatal(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
