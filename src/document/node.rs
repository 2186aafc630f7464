//! Document tree shared by both conversion directions.
//!
//! A [`Document`] is what a properties file is built into and what a YAML
//! document is flattened from. Mapping entries are kept in sorted key order so
//! that output is a pure function of the input's content.
//!
//! # Example
//!
//! ```
//! use propyaml::document::node::{Document, Scalar};
//! use std::collections::BTreeMap;
//!
//! let mut server = BTreeMap::new();
//! server.insert("port".to_string(), Document::Scalar(Scalar::String("8080".into())));
//!
//! let mut root = BTreeMap::new();
//! root.insert("server".to_string(), Document::Mapping(server));
//! let doc = Document::Mapping(root);
//!
//! assert!(doc.is_mapping());
//! assert_eq!(doc.get("server").and_then(|s| s.get("port")).map(|p| p.is_scalar()), Some(true));
//! ```

use super::scalar::{Decimal, ScalarKind};
use num_bigint::BigInt;
use std::collections::BTreeMap;
use std::fmt;

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Integer(BigInt),
    Decimal(Decimal),
    Boolean(bool),
    String(String),
    /// Only produced by YAML input (`key:` or `key: ~`)
    Null,
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Decimal(_) => ScalarKind::Decimal,
            Scalar::Boolean(_) => ScalarKind::Boolean,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Null => ScalarKind::Null,
        }
    }
}

/// Renders the properties form of the value. `Null` renders as the empty string.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Decimal(d) => write!(f, "{}", d),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::String(s) => f.write_str(s),
            Scalar::Null => Ok(()),
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Scalar(Scalar),
    Sequence(Vec<Document>),
    Mapping(BTreeMap<String, Document>),
}

impl Document {
    /// An empty mapping, the value of an empty properties file.
    pub fn empty_mapping() -> Self {
        Document::Mapping(BTreeMap::new())
    }

    /// Returns true if this node is a mapping.
    ///
    /// # Example
    ///
    /// ```
    /// use propyaml::document::node::{Document, Scalar};
    ///
    /// assert!(Document::empty_mapping().is_mapping());
    /// assert!(!Document::Scalar(Scalar::Null).is_mapping());
    /// ```
    pub fn is_mapping(&self) -> bool {
        matches!(self, Document::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Document::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Document::Scalar(_))
    }

    /// Returns true for a mapping or sequence without children.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Document::Mapping(map) => map.is_empty(),
            Document::Sequence(items) => items.is_empty(),
            Document::Scalar(_) => false,
        }
    }

    /// Looks up a mapping entry.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Looks up a sequence item.
    pub fn item(&self, index: usize) -> Option<&Document> {
        match self {
            Document::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Document::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for Document {
    fn from(scalar: Scalar) -> Self {
        Document::Scalar(scalar)
    }
}
