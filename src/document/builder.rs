//! Builds a document tree from flat `key=value` assignments.
//!
//! Construction happens in two phases. Every assignment is first recorded in
//! an accumulating node that keeps direct values, indexed children and named
//! children side by side. Resolution then turns each accumulating node into
//! exactly one [`Document`] shape and reports every conflict it had to settle.
//!
//! # Example
//!
//! ```
//! use propyaml::document::builder::TreeBuilder;
//! use indexmap::IndexMap;
//!
//! let mut props = IndexMap::new();
//! props.insert("server.port".to_string(), vec!["8080".to_string()]);
//! props.insert("server.ssl.enabled".to_string(), vec!["true".to_string()]);
//!
//! let built = TreeBuilder::from_properties(&props).build();
//! assert!(built.status.is_ok());
//! assert!(built.document.get("server").and_then(|s| s.get("ssl")).is_some());
//! ```

use super::node::{Document, Scalar};
use super::scalar::infer;
use crate::path::{Parser, PropertyPath, Segment};
use crate::status::{ConversionStatus, Diagnostic};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Result of resolving a tree: the document and every diagnostic raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    pub document: Document,
    pub status: ConversionStatus,
}

/// A node before resolution. All three slots may be populated at once.
#[derive(Debug, Default)]
struct Accumulating {
    scalars: Vec<String>,
    list_items: BTreeMap<usize, Accumulating>,
    map_entries: BTreeMap<String, Accumulating>,
}

/// Output of resolving one accumulating node.
struct Resolved {
    document: Document,
    diagnostics: Vec<Diagnostic>,
}

impl Accumulating {
    fn insert(&mut self, segments: &[Segment], values: &[String]) {
        match segments.split_first() {
            None => self.scalars.extend(values.iter().cloned()),
            Some((Segment::Name(name), rest)) => self
                .map_entries
                .entry(name.clone())
                .or_default()
                .insert(rest, values),
            Some((Segment::Index(index), rest)) => self
                .list_items
                .entry(*index)
                .or_default()
                .insert(rest, values),
        }
    }

    /// Moves `other`'s contributions into `self`.
    fn absorb(&mut self, other: Accumulating) {
        self.scalars.extend(other.scalars);
        for (index, item) in other.list_items {
            self.list_items.entry(index).or_default().absorb(item);
        }
        for (name, entry) in other.map_entries {
            self.map_entries.entry(name).or_default().absorb(entry);
        }
    }

    /// Re-keys list items as map entries named by their decimal index.
    fn merge_list_into_map(&mut self) {
        let items = std::mem::take(&mut self.list_items);
        for (index, item) in items {
            self.map_entries
                .entry(index.to_string())
                .or_default()
                .absorb(item);
        }
    }

    fn has_children(&self) -> bool {
        !self.list_items.is_empty() || !self.map_entries.is_empty()
    }

    fn resolve(mut self, path: &PropertyPath) -> Resolved {
        let mut diagnostics = Vec::new();

        if !self.has_children() {
            let document = match self.scalars.len() {
                0 => Document::empty_mapping(),
                1 => Document::Scalar(infer(&self.scalars[0])),
                _ => {
                    diagnostics.push(Diagnostic::warning(format!(
                        "Multiple values [{}] assigned to '{}'. Values are merged into a yaml sequence node.",
                        self.scalars.join(", "),
                        path
                    )));
                    Document::Sequence(
                        self.scalars
                            .iter()
                            .map(|raw| Document::Scalar(infer(raw)))
                            .collect(),
                    )
                }
            };
            trace!(path = %path, "resolved leaf");
            return Resolved {
                document,
                diagnostics,
            };
        }

        if !self.scalars.is_empty() {
            diagnostics.push(Diagnostic::error(self.scalar_conflict_message(path)));
            self.scalars.clear();
        }

        if !self.list_items.is_empty() && !self.map_entries.is_empty() {
            diagnostics.push(Diagnostic::warning(format!(
                "'{}' has some entries that look like list items and others that look like map entries. All these entries are treated as map entries!",
                path
            )));
            self.merge_list_into_map();
        }

        let document = if self.map_entries.is_empty() {
            let mut items = Vec::with_capacity(self.list_items.len());
            for (index, item) in self.list_items {
                let resolved = item.resolve(&path.child_index(index));
                diagnostics.extend(resolved.diagnostics);
                items.push(resolved.document);
            }
            Document::Sequence(items)
        } else {
            let mut entries = BTreeMap::new();
            for (name, entry) in self.map_entries {
                let resolved = entry.resolve(&path.child_name(&name));
                diagnostics.extend(resolved.diagnostics);
                entries.insert(name, resolved.document);
            }
            Document::Mapping(entries)
        };

        Resolved {
            document,
            diagnostics,
        }
    }

    /// Names the direct assignment and the first child that conflicts with it.
    fn scalar_conflict_message(&self, path: &PropertyPath) -> String {
        let assigned = match self.scalars.as_slice() {
            [single] => single.clone(),
            many => format!("[{}]", many.join(", ")),
        };
        match self.map_entries.keys().next() {
            Some(name) => format!(
                "Direct assignment '{}={}' can not be combined with sub-property assignment '{}...'. Direct assignment is dropped!",
                path,
                assigned,
                path.child_name(name)
            ),
            None => {
                let index = self.list_items.keys().next().copied().unwrap_or_default();
                format!(
                    "Direct assignment '{}={}' can not be combined with sequence assignment '{}...'. Direct assignments are dropped!",
                    path,
                    assigned,
                    path.child_index(index)
                )
            }
        }
    }
}

/// Collects flat assignments and resolves them into a document.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: Accumulating,
    diagnostics: Vec<Diagnostic>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a tokenized properties file.
    ///
    /// Keys that are not valid property paths are dropped with an ERROR.
    pub fn from_properties(props: &IndexMap<String, Vec<String>>) -> Self {
        let mut builder = TreeBuilder::new();
        for (key, values) in props {
            match Parser::parse(key) {
                Ok(path) => builder.insert(&path, values),
                Err(err) => {
                    debug!(key = %key, error = %err, "dropping unparsable key");
                    builder.diagnostics.push(Diagnostic::error(format!(
                        "Property '{}' is not a valid property path ({}). It is dropped!",
                        key, err
                    )));
                }
            }
        }
        builder
    }

    /// Records the values assigned to `path`, in order.
    pub fn insert(&mut self, path: &PropertyPath, values: &[String]) {
        self.root.insert(path.segments(), values);
    }

    /// Resolves all assignments. The root is always a mapping.
    pub fn build(self) -> Built {
        let mut root = self.root;
        let mut diagnostics = self.diagnostics;
        let root_path = PropertyPath::root();

        if !root.scalars.is_empty() {
            diagnostics.push(Diagnostic::error(root.scalar_conflict_message(&root_path)));
            root.scalars.clear();
        }
        if !root.list_items.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "Top-level entries that look like list items are treated as map entries!",
            ));
            root.merge_list_into_map();
        }

        let resolved = root.resolve(&root_path);
        diagnostics.extend(resolved.diagnostics);
        debug!(diagnostics = diagnostics.len(), "document built");

        Built {
            document: resolved.document,
            status: ConversionStatus::from_diagnostics(diagnostics),
        }
    }
}

/// Convenience wrapper used by the conversion pipeline.
pub fn build_document(props: &IndexMap<String, Vec<String>>) -> Built {
    TreeBuilder::from_properties(props).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Severity;
    use num_bigint::BigInt;

    fn props(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn string(s: &str) -> Document {
        Document::Scalar(Scalar::String(s.to_string()))
    }

    #[test]
    fn test_empty_input_builds_empty_mapping() {
        let built = build_document(&IndexMap::new());
        assert_eq!(built.document, Document::empty_mapping());
        assert!(built.status.is_ok());
    }

    #[test]
    fn test_nested_mapping() {
        let built = build_document(&props(&[
            ("some.thing", &["hello"]),
            ("some.other", &["8888"]),
        ]));
        let some = built.document.get("some").unwrap();
        assert_eq!(some.get("thing"), Some(&string("hello")));
        assert_eq!(
            some.get("other"),
            Some(&Document::Scalar(Scalar::Integer(BigInt::from(8888))))
        );
        assert!(built.status.is_ok());
    }

    #[test]
    fn test_sparse_list_is_compacted() {
        let built = build_document(&props(&[
            ("list[5]", &["c"]),
            ("list[0]", &["a"]),
            ("list[2]", &["b"]),
        ]));
        assert_eq!(
            built.document.get("list"),
            Some(&Document::Sequence(vec![string("a"), string("b"), string("c")]))
        );
    }

    #[test]
    fn test_multiple_values_merge_into_sequence() {
        let built = build_document(&props(&[("some.property", &["something", "something-else"])]));
        let property = built.document.get("some").and_then(|s| s.get("property"));
        assert_eq!(
            property,
            Some(&Document::Sequence(vec![string("something"), string("something-else")]))
        );
        assert_eq!(built.status.severity(), Severity::Warning);
        assert_eq!(
            built.status.entries()[0].message,
            "Multiple values [something, something-else] assigned to 'some.property'. Values are merged into a yaml sequence node."
        );
    }

    #[test]
    fn test_scalar_and_map_conflict_drops_scalar() {
        let built = build_document(&props(&[
            ("some.property", &["a-scalar"]),
            ("some.property.sub", &["sub-value"]),
        ]));
        assert_eq!(built.status.severity(), Severity::Error);
        assert_eq!(
            built.status.entries()[0].message,
            "Direct assignment 'some.property=a-scalar' can not be combined with sub-property assignment 'some.property.sub...'. Direct assignment is dropped!"
        );
        let property = built.document.get("some").and_then(|s| s.get("property")).unwrap();
        assert_eq!(property.get("sub"), Some(&string("sub-value")));
    }

    #[test]
    fn test_scalar_and_list_conflict_drops_scalar() {
        let built = build_document(&props(&[
            ("some.property", &["a-scalar"]),
            ("some.property[0]", &["zero"]),
            ("some.property[1]", &["one"]),
        ]));
        assert_eq!(built.status.severity(), Severity::Error);
        assert_eq!(
            built.status.entries()[0].message,
            "Direct assignment 'some.property=a-scalar' can not be combined with sequence assignment 'some.property[0]...'. Direct assignments are dropped!"
        );
        let property = built.document.get("some").and_then(|s| s.get("property"));
        assert_eq!(
            property,
            Some(&Document::Sequence(vec![string("zero"), string("one")]))
        );
    }

    #[test]
    fn test_list_and_map_children_merge_into_mapping() {
        let built = build_document(&props(&[
            ("some.property.abc", &["val1"]),
            ("some.property[0]", &["zero"]),
            ("some.property.def", &["val2"]),
            ("some.property[1]", &["one"]),
        ]));
        assert_eq!(built.status.severity(), Severity::Warning);
        assert_eq!(
            built.status.entries()[0].message,
            "'some.property' has some entries that look like list items and others that look like map entries. All these entries are treated as map entries!"
        );
        let property = built.document.get("some").and_then(|s| s.get("property"));
        let Some(Document::Mapping(map)) = property else {
            panic!("Expected mapping, got {:?}", property);
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["0", "1", "abc", "def"]);
    }

    #[test]
    fn test_scalar_with_list_and_map_reports_error_and_warning() {
        let built = build_document(&props(&[
            ("some.property", &["a-scalar"]),
            ("some.property[0]", &["zero"]),
            ("some.property.abc", &["val1"]),
        ]));
        assert_eq!(built.status.severity(), Severity::Error);
        let messages: Vec<&str> = built.status.entries().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'some.property.abc...'"));
        assert!(messages[1].contains("treated as map entries"));
    }

    #[test]
    fn test_multi_valued_scalar_conflict_lists_all_values() {
        let built = build_document(&props(&[("a", &["x", "y"]), ("a.b", &["z"])]));
        assert!(built.status.entries()[0]
            .message
            .starts_with("Direct assignment 'a=[x, y]'"));
    }

    #[test]
    fn test_index_key_collides_with_name_key() {
        let built = build_document(&props(&[("a.0.b", &["named"]), ("a[0].c", &["indexed"])]));
        let zero = built.document.get("a").and_then(|a| a.get("0")).unwrap();
        assert_eq!(zero.get("b"), Some(&string("named")));
        assert_eq!(zero.get("c"), Some(&string("indexed")));
    }

    #[test]
    fn test_top_level_list_items_become_map_entries() {
        let built = build_document(&props(&[("[0]", &["a"]), ("[1].x", &["b"])]));
        assert!(built.document.is_mapping());
        assert_eq!(built.document.get("0"), Some(&string("a")));
        assert_eq!(built.status.severity(), Severity::Warning);
    }

    #[test]
    fn test_unparsable_key_is_dropped_with_error() {
        let built = build_document(&props(&[("a[x]", &["bad"]), ("b", &["good"])]));
        assert_eq!(built.status.severity(), Severity::Error);
        assert!(built.status.entries()[0].message.contains("'a[x]'"));
        assert!(built.document.get("a").is_none());
        assert_eq!(built.document.get("b"), Some(&string("good")));
    }

    #[test]
    fn test_nested_lists_of_maps() {
        let built = build_document(&props(&[
            ("servers[0].host", &["a"]),
            ("servers[0].port", &["1"]),
            ("servers[1].host", &["b"]),
        ]));
        let first = built.document.get("servers").and_then(|s| s.item(0)).unwrap();
        assert_eq!(first.get("host"), Some(&string("a")));
        let second = built.document.get("servers").and_then(|s| s.item(1)).unwrap();
        assert!(second.get("port").is_none());
    }
}
