//! Document model and the two tree transformations.
//!
//! [`builder`] turns flat properties into a [`node::Document`]; [`flatten`]
//! turns a document back into flat entries. [`scalar`] holds the value type
//! inference both directions agree on.

pub mod builder;
pub mod flatten;
pub mod node;
pub mod scalar;

pub use builder::{build_document, Built, TreeBuilder};
pub use flatten::{flatten, FlatEntry, Flattened};
pub use node::{Document, Scalar};
pub use scalar::{Decimal, ScalarKind};
