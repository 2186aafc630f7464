//! propyaml - loss-aware conversion between Spring Boot `.properties` and YAML.
//!
//! The conversion engine is made of small pieces that can be used on their own:
//!
//! - [`path`] parses flat keys such as `spring.servers[0].host`
//! - [`document`] builds a tree from flat entries and flattens it back
//! - [`file`] reads and writes both formats and applies changes to disk
//! - [`refactor`] runs a whole file conversion and reports what was lost
//!
//! # Example
//!
//! ```
//! use propyaml::refactor::convert::{convert, Direction};
//!
//! let converted = convert(
//!     Direction::PropertiesToYaml,
//!     "some.property=something\nsome.property=something-else\n",
//!     2,
//! );
//! assert_eq!(converted.text, "some:\n  property:\n  - something\n  - something-else\n");
//! assert_eq!(converted.status.entries().len(), 1);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod file;
pub mod path;
pub mod refactor;
pub mod status;

pub use error::{Error, Result};
