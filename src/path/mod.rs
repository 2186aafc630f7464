//! Property paths: the structured form of a flat `.properties` key.
//!
//! A key such as `spring.datasource[0].url` is a sequence of segments that
//! address a location inside a nested YAML document.
//!
//! # Supported Syntax
//!
//! - `name` - Map key (`Name` segment)
//! - `.name` - Next map key
//! - `[index]` - Sequence position (`Index` segment, canonical decimal)
//!
//! # Examples
//!
//! ```
//! use propyaml::path::{Parser, Segment};
//!
//! let path = Parser::parse("some.thing[1].a").unwrap();
//! assert_eq!(path.head(), Some(&Segment::Name("some".to_string())));
//! assert_eq!(path.to_string(), "some.thing[1].a");
//! ```

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{PropertyPath, Segment};
pub use error::PathError;
pub use parser::Parser;
