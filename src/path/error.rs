//! Error types for property key parsing.

use std::fmt;

/// Errors that can occur while parsing a property key into a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Unexpected character at a specific position.
    UnexpectedChar {
        position: usize,
        found: char,
        expected: String,
    },
    /// Unexpected end of input.
    UnexpectedEnd { expected: String },
    /// Index that is not a canonical non-negative decimal.
    InvalidIndex { position: usize, digits: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::UnexpectedChar {
                position,
                found,
                expected,
            } => write!(
                f,
                "unexpected character '{}' at position {}, expected {}",
                found, position, expected
            ),
            PathError::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of key, expected {}", expected)
            }
            PathError::InvalidIndex { position, digits } => {
                write!(f, "invalid list index '{}' at position {}", digits, position)
            }
        }
    }
}

impl std::error::Error for PathError {}
