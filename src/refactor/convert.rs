//! The pure conversion step: source text in, output text and status out.
//!
//! Nothing here touches the file system. Unreadable input is reported as a
//! FATAL diagnostic with empty output rather than as an `Err`.

use crate::document::builder::build_document;
use crate::document::flatten::flatten;
use crate::file::loader::load_yaml;
use crate::file::properties;
use crate::file::saver::{join_documents, serialize_yaml};
use crate::status::{ConversionStatus, Diagnostic};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which way a file is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    PropertiesToYaml,
    YamlToProperties,
}

impl Direction {
    /// Infers the direction from the source file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use propyaml::refactor::convert::Direction;
    /// use std::path::Path;
    ///
    /// assert_eq!(Direction::infer(Path::new("application.properties")), Some(Direction::PropertiesToYaml));
    /// assert_eq!(Direction::infer(Path::new("application.yaml")), Some(Direction::YamlToProperties));
    /// assert_eq!(Direction::infer(Path::new("README")), None);
    /// ```
    pub fn infer(source: &Path) -> Option<Direction> {
        match source.extension().and_then(|e| e.to_str()) {
            Some("properties") => Some(Direction::PropertiesToYaml),
            Some("yml") | Some("yaml") => Some(Direction::YamlToProperties),
            _ => None,
        }
    }

    /// Computes the target file name: the extension is replaced, or appended
    /// when the source has none.
    pub fn target_path(self, source: &Path, yaml_extension: &str) -> PathBuf {
        match self {
            Direction::PropertiesToYaml => source.with_extension(yaml_extension),
            Direction::YamlToProperties => source.with_extension("properties"),
        }
    }
}

/// Output text and the diagnostics raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub text: String,
    pub status: ConversionStatus,
}

impl Converted {
    fn fatal(message: String) -> Self {
        Converted {
            text: String::new(),
            status: ConversionStatus::from_diagnostics(vec![Diagnostic::fatal(message)]),
        }
    }
}

/// Runs the conversion in `direction`.
pub fn convert(direction: Direction, text: &str, indent_size: usize) -> Converted {
    match direction {
        Direction::PropertiesToYaml => properties_to_yaml(text, indent_size),
        Direction::YamlToProperties => yaml_to_properties(text),
    }
}

/// Builds a document from properties text and renders it as YAML.
///
/// # Example
///
/// ```
/// use propyaml::refactor::convert::properties_to_yaml;
///
/// let converted = properties_to_yaml("some.thing=vvvv\nsome.other.thing=blah\n", 2);
/// assert_eq!(converted.text, "some:\n  other:\n    thing: blah\n  thing: vvvv\n");
/// assert!(converted.status.is_ok());
/// ```
pub fn properties_to_yaml(text: &str, indent_size: usize) -> Converted {
    let props = match properties::load(text) {
        Ok(props) => props,
        Err(err) => return Converted::fatal(format!("Unable to read properties: {}", err)),
    };
    debug!(keys = props.len(), "converting properties to YAML");

    let built = build_document(&props);
    Converted {
        text: serialize_yaml(&built.document, indent_size),
        status: built.status,
    }
}

/// Flattens every document of a YAML stream into properties text.
///
/// Output of consecutive documents is separated by a `#---` line.
pub fn yaml_to_properties(text: &str) -> Converted {
    let loaded = match load_yaml(text) {
        Ok(loaded) => loaded,
        Err(err) => return Converted::fatal(format!("Unable to read YAML: {}", err)),
    };
    debug!(documents = loaded.documents.len(), "converting YAML to properties");

    let mut status = loaded.status;
    let mut renderings = Vec::with_capacity(loaded.documents.len());
    for document in &loaded.documents {
        match document {
            Some(document) => {
                let flattened = flatten(document);
                status = status.merge(flattened.status);
                renderings.push(Some(properties::store(&flattened.entries)));
            }
            None => renderings.push(None),
        }
    }

    if status.has_fatal() {
        return Converted {
            text: String::new(),
            status,
        };
    }

    Converted {
        text: join_documents(renderings),
        status,
    }
}
