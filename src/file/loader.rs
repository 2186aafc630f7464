//! Source loading.
//!
//! Reads source text from disk or stdin and turns YAML text into
//! [`Document`]s.

use crate::document::node::{Document, Scalar};
use crate::document::scalar::Decimal;
use crate::error::{Error, Result};
use crate::path::PropertyPath;
use crate::status::{ConversionStatus, Diagnostic};
use num_bigint::BigInt;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use yaml_rust2::{Yaml, YamlLoader};

/// The documents of a YAML stream. `None` marks an empty or null document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedYaml {
    pub documents: Vec<Option<Document>>,
    pub status: ConversionStatus,
}

/// Reads a source file as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Reads stdin to the end as UTF-8 text.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| Error::io("<stdin>", e))?;
    Ok(buffer)
}

/// Parses every document of a YAML stream.
///
/// Anchors and aliases are resolved by the parser. Mapping keys are turned
/// into strings; when two keys collapse to the same string the later entry
/// wins and a WARNING is reported.
///
/// # Example
///
/// ```
/// use propyaml::file::loader::load_yaml;
///
/// let loaded = load_yaml("a: 1\n---\n---\nb: [x, y]\n").unwrap();
/// assert_eq!(loaded.documents.len(), 3);
/// assert!(loaded.documents[1].is_none());
/// ```
///
/// # Errors
///
/// Returns [`Error::YamlScan`] if the text is not well-formed YAML.
pub fn load_yaml(text: &str) -> Result<LoadedYaml> {
    let docs = YamlLoader::load_from_str(text)?;
    debug!(documents = docs.len(), "parsed YAML stream");

    let mut diagnostics = Vec::new();
    let documents = docs
        .iter()
        .map(|yaml| match yaml {
            Yaml::Null | Yaml::BadValue => None,
            other => Some(convert(other, &PropertyPath::root(), &mut diagnostics)),
        })
        .collect();

    Ok(LoadedYaml {
        documents,
        status: ConversionStatus::from_diagnostics(diagnostics),
    })
}

fn convert(yaml: &Yaml, path: &PropertyPath, diagnostics: &mut Vec<Diagnostic>) -> Document {
    match yaml {
        Yaml::Hash(hash) => {
            let mut map = BTreeMap::new();
            for (key, value) in hash {
                let key = key_text(key);
                let child = convert(value, &path.child_name(&key), diagnostics);
                if map.insert(key.clone(), child).is_some() {
                    diagnostics.push(Diagnostic::warning(format!(
                        "Duplicate key '{}' at '{}'. Only the last value is kept!",
                        key, path
                    )));
                }
            }
            Document::Mapping(map)
        }
        Yaml::Array(items) => Document::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &path.child_index(i), diagnostics))
                .collect(),
        ),
        Yaml::Integer(i) => Document::Scalar(Scalar::Integer(BigInt::from(*i))),
        Yaml::Real(text) => Document::Scalar(real(text)),
        Yaml::Boolean(b) => Document::Scalar(Scalar::Boolean(*b)),
        Yaml::String(s) => Document::Scalar(Scalar::String(s.clone())),
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => Document::Scalar(Scalar::Null),
    }
}

/// Keeps the source spelling of a float unless it is already canonical.
fn real(text: &str) -> Scalar {
    match text.parse::<BigInt>() {
        Ok(integer) if integer.to_string() == text => return Scalar::Integer(integer),
        _ => {}
    }
    match text.parse::<Decimal>() {
        Ok(decimal) if decimal.to_string() == text => Scalar::Decimal(decimal),
        _ => Scalar::String(text.to_string()),
    }
}

/// String form of a mapping key.
fn key_text(key: &Yaml) -> String {
    match key {
        Yaml::String(s) | Yaml::Real(s) => s.clone(),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => "null".to_string(),
        Yaml::Array(items) => {
            let parts: Vec<String> = items.iter().map(key_text).collect();
            format!("[{}]", parts.join(", "))
        }
        Yaml::Hash(hash) => {
            let parts: Vec<String> = hash
                .iter()
                .map(|(k, v)| format!("{}: {}", key_text(k), key_text(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Severity;

    fn single(text: &str) -> Document {
        let mut loaded = load_yaml(text).unwrap();
        assert_eq!(loaded.documents.len(), 1);
        loaded.documents.remove(0).unwrap()
    }

    #[test]
    fn test_load_typed_scalars() {
        let doc = single("i: 42\nd: 0.78\nb: true\ns: hello\nn:\nq: '123'\n");
        assert_eq!(doc.get("i"), Some(&Document::Scalar(Scalar::Integer(BigInt::from(42)))));
        assert_eq!(doc.get("d").map(|d| d.as_scalar().map(|s| s.to_string())), Some(Some("0.78".to_string())));
        assert_eq!(doc.get("b"), Some(&Document::Scalar(Scalar::Boolean(true))));
        assert_eq!(doc.get("s"), Some(&Document::Scalar(Scalar::String("hello".into()))));
        assert_eq!(doc.get("n"), Some(&Document::Scalar(Scalar::Null)));
        assert_eq!(doc.get("q"), Some(&Document::Scalar(Scalar::String("123".into()))));
    }

    #[test]
    fn test_load_keeps_float_spelling() {
        let doc = single("a: 1e3\nb: .inf\nc: 1.50\n");
        let text = |k: &str| doc.get(k).and_then(Document::as_scalar).map(|s| s.to_string());
        assert_eq!(text("a"), Some("1e3".to_string()));
        assert_eq!(text("b"), Some(".inf".to_string()));
        assert_eq!(text("c"), Some("1.50".to_string()));
    }

    #[test]
    fn test_load_big_integer_keeps_digits() {
        let big = "989898989898989898989898989898989898989898";
        let doc = single(&format!("big: {}\n", big));
        assert_eq!(
            doc.get("big").and_then(Document::as_scalar).map(|s| s.to_string()),
            Some(big.to_string())
        );
    }

    #[test]
    fn test_load_nested_and_sequences() {
        let doc = single("a:\n  b:\n    - x\n    - c: 1\n");
        let b = doc.get("a").and_then(|a| a.get("b")).unwrap();
        assert!(b.is_sequence());
        assert!(b.item(1).and_then(|i| i.get("c")).is_some());
    }

    #[test]
    fn test_load_resolves_aliases() {
        let doc = single("base: &b\n  x: 1\nother: *b\n");
        assert_eq!(doc.get("base"), doc.get("other"));
    }

    #[test]
    fn test_load_non_string_keys() {
        let doc = single("1: one\ntrue: yes\n");
        assert!(doc.get("1").is_some());
        assert!(doc.get("true").is_some());
    }

    #[test]
    fn test_duplicate_stringified_keys_warn() {
        let loaded = load_yaml("1: int\n'1': string\n").unwrap();
        assert_eq!(loaded.status.severity(), Severity::Warning);
        let doc = loaded.documents[0].as_ref().unwrap();
        assert_eq!(doc.get("1"), Some(&Document::Scalar(Scalar::String("string".into()))));
    }

    #[test]
    fn test_load_multi_document_stream() {
        let loaded = load_yaml("a: 1\n---\n---\nb: 2\n").unwrap();
        assert_eq!(loaded.documents.len(), 3);
        assert!(loaded.documents[0].is_some());
        assert!(loaded.documents[1].is_none());
        assert!(loaded.documents[2].is_some());
    }

    #[test]
    fn test_load_empty_text() {
        let loaded = load_yaml("").unwrap();
        assert!(loaded.documents.is_empty());
    }

    #[test]
    fn test_load_malformed_yaml() {
        match load_yaml("a: [1, 2\n") {
            Err(Error::YamlScan(_)) => {}
            other => panic!("Expected YamlScan error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match read_source(&dir.path().join("missing.yml")) {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("missing.yml")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
