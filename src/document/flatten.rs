//! Flattens a document tree into `key=value` entries.

use super::node::Document;
use crate::path::PropertyPath;
use crate::status::{ConversionStatus, Diagnostic};
use tracing::trace;

/// A single property produced by flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    pub path: PropertyPath,
    pub value: String,
}

impl FlatEntry {
    pub fn key(&self) -> String {
        self.path.to_string()
    }
}

/// Entries in traversal order plus the diagnostics raised while flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub entries: Vec<FlatEntry>,
    pub status: ConversionStatus,
}

/// Flattens a document whose root must be a mapping.
///
/// Mappings are walked in key order and sequences by position. A non-mapping
/// root yields a FATAL diagnostic and no entries. Empty mappings and sequences
/// have no properties form; each one is reported as a WARNING.
pub fn flatten(document: &Document) -> Flattened {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    match document {
        Document::Mapping(map) => {
            for (key, value) in map {
                walk(value, PropertyPath::root().child_name(key), &mut entries, &mut diagnostics);
            }
        }
        Document::Sequence(_) => diagnostics.push(Diagnostic::fatal(
            "The document root is a sequence. Only documents with a mapping at the root can be converted to properties!",
        )),
        Document::Scalar(_) => diagnostics.push(Diagnostic::fatal(
            "The document root is a scalar. Only documents with a mapping at the root can be converted to properties!",
        )),
    }

    Flattened {
        entries,
        status: ConversionStatus::from_diagnostics(diagnostics),
    }
}

fn walk(
    node: &Document,
    path: PropertyPath,
    entries: &mut Vec<FlatEntry>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match node {
        Document::Scalar(scalar) => {
            trace!(path = %path, "flat entry");
            entries.push(FlatEntry {
                path,
                value: scalar.to_string(),
            });
        }
        empty if empty.is_empty_container() => {
            let shape = if empty.is_mapping() { "map" } else { "sequence" };
            diagnostics.push(Diagnostic::warning(format!(
                "'{}' is an empty {}, which has no properties equivalent. It is dropped!",
                path, shape
            )));
        }
        Document::Mapping(map) => {
            for (key, value) in map {
                walk(value, path.child_name(key), entries, diagnostics);
            }
        }
        Document::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, path.child_index(index), entries, diagnostics);
            }
        }
    }
}
