//! Output rendering and file writing.
//!
//! This module renders a [`Document`] as block-style YAML, joins the
//! properties renderings of several YAML documents, and writes results to
//! disk atomically with optional backups.

use crate::document::node::{Document, Scalar};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Separator placed between the properties renderings of consecutive YAML
/// documents. It reads as a comment to any properties loader.
pub const DOCUMENT_SEPARATOR: &str = "#---\n";

/// Plain scalars a YAML 1.1 loader would resolve to something other than a string.
static IMPLICIT_TYPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // bool
        r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF|y|Y|n|N)$",
        // int
        r"^(?:[-+]?0b_*[0-1]+[0-1_]*|[-+]?0_*[0-7]+[0-7_]*|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x_*[0-9a-fA-F]+[0-9a-fA-F_]*|[-+]?0o[0-7]+|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
        // float
        r"^(?:[-+]?(?:\.[0-9]+|[0-9_]+(?:\.[0-9_]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
        // null
        r"^(?:~|null|Null|NULL)$",
        // timestamp
        r"^(?:[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]|[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?(?:[Tt]|[ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9][0-9]?(?::[0-9][0-9])?))?)$",
        // merge and value keys
        r"^(?:<<|=)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid resolver regex"))
    .collect()
});

/// How a string must be written to read back as the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

/// Chooses the least intrusive style that keeps `s` a string.
pub fn quote_style(s: &str) -> QuoteStyle {
    if s.chars().any(needs_escape) {
        return QuoteStyle::DoubleQuoted;
    }
    if s.is_empty()
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || starts_with_indicator(s)
        || s.contains(": ")
        || s.contains(" #")
        || s.ends_with(':')
        || IMPLICIT_TYPES.iter().any(|re| re.is_match(s))
    {
        return QuoteStyle::SingleQuoted;
    }
    QuoteStyle::Plain
}

fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}')
}

fn starts_with_indicator(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(
            '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
            | '@' | '`',
        ) => true,
        Some('-' | '?' | ':') => chars.next().map_or(true, char::is_whitespace),
        _ => false,
    }
}

/// Renders a string scalar or mapping key.
pub fn quote_string(s: &str) -> String {
    match quote_style(s) {
        QuoteStyle::Plain => s.to_string(),
        QuoteStyle::SingleQuoted => format!("'{}'", s.replace('\'', "''")),
        QuoteStyle::DoubleQuoted => format!("\"{}\"", escape_double_quoted(s)),
    }
}

/// Escapes a string for a double-quoted YAML scalar.
fn escape_double_quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\0' => result.push_str("\\0"),
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\x0b' => result.push_str("\\v"),
            '\x0c' => result.push_str("\\f"),
            '\r' => result.push_str("\\r"),
            '\x1b' => result.push_str("\\e"),
            '\u{85}' => result.push_str("\\N"),
            '\u{2028}' => result.push_str("\\L"),
            '\u{2029}' => result.push_str("\\P"),
            c if (c as u32) < 0x100 && needs_escape(c) => {
                result.push_str(&format!("\\x{:02X}", c as u32));
            }
            c if needs_escape(c) => {
                result.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => result.push(c),
        }
    }

    result
}

fn serialize_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::String(s) => quote_string(s),
        Scalar::Null => "null".to_string(),
        typed => typed.to_string(),
    }
}

/// Serializes a document as block-style YAML.
///
/// Mappings nest by `indent_size` spaces (at least one). A sequence that is the value of a
/// mapping key starts at the key's own indentation. An empty root mapping
/// renders as the empty string.
///
/// # Example
///
/// ```
/// use propyaml::document::builder::build_document;
/// use propyaml::file::properties::load;
/// use propyaml::file::saver::serialize_yaml;
///
/// let props = load("some.thing=hello\nsome.list[0]=a\n").unwrap();
/// let yaml = serialize_yaml(&build_document(&props).document, 2);
/// assert_eq!(yaml, "some:\n  list:\n  - a\n  thing: hello\n");
/// ```
pub fn serialize_yaml(document: &Document, indent_size: usize) -> String {
    // Zero would put children at their parent's column
    let indent_size = indent_size.max(1);
    let mut out = String::new();
    match document {
        Document::Mapping(map) if map.is_empty() => {}
        Document::Mapping(map) => write_mapping(&mut out, map, indent_size, 0, false),
        Document::Sequence(items) if items.is_empty() => out.push_str("[]\n"),
        Document::Sequence(items) => write_sequence(&mut out, items, indent_size, 0, false),
        Document::Scalar(scalar) => {
            out.push_str(&serialize_scalar(scalar));
            out.push('\n');
        }
    }
    out
}

/// Writes mapping entries at `column`. With `inline_first`, the caller has
/// already written the prefix of the first line.
fn write_mapping(
    out: &mut String,
    map: &BTreeMap<String, Document>,
    indent_size: usize,
    column: usize,
    inline_first: bool,
) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 || !inline_first {
            out.push_str(&" ".repeat(column));
        }
        out.push_str(&quote_string(key));
        out.push(':');
        match value {
            Document::Scalar(scalar) => {
                out.push(' ');
                out.push_str(&serialize_scalar(scalar));
                out.push('\n');
            }
            Document::Mapping(child) if child.is_empty() => out.push_str(" {}\n"),
            Document::Sequence(items) if items.is_empty() => out.push_str(" []\n"),
            Document::Mapping(child) => {
                out.push('\n');
                write_mapping(out, child, indent_size, column + indent_size, false);
            }
            Document::Sequence(items) => {
                out.push('\n');
                write_sequence(out, items, indent_size, column, false);
            }
        }
    }
}

/// Writes `- item` lines at `column`.
fn write_sequence(
    out: &mut String,
    items: &[Document],
    indent_size: usize,
    column: usize,
    inline_first: bool,
) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            out.push_str(&" ".repeat(column));
        }
        out.push_str("- ");
        match item {
            Document::Scalar(scalar) => {
                out.push_str(&serialize_scalar(scalar));
                out.push('\n');
            }
            Document::Mapping(child) if child.is_empty() => out.push_str("{}\n"),
            Document::Sequence(nested) if nested.is_empty() => out.push_str("[]\n"),
            Document::Mapping(child) => write_mapping(out, child, indent_size, column + 2, true),
            Document::Sequence(nested) => write_sequence(out, nested, indent_size, column + 2, true),
        }
    }
}

/// Joins the properties renderings of a multi-document YAML stream.
///
/// `None` stands for an empty or null document. A separator is inserted
/// before a rendered document whenever output has already been produced, and
/// after output for each empty document.
pub fn join_documents<I>(renderings: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut out = String::new();
    for rendering in renderings {
        match rendering {
            Some(text) => {
                if !out.is_empty() {
                    out.push_str(DOCUMENT_SEPARATOR);
                }
                out.push_str(&text);
            }
            None => {
                if !out.is_empty() {
                    out.push_str(DOCUMENT_SEPARATOR);
                }
            }
        }
    }
    out
}

/// Path of the backup copy for `path`: the file name with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copies `path` to its `.bak` sibling.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|e| Error::io(path, e))?;
    Ok(backup)
}

/// Writes `data` to a temporary sibling, then renames it over `path`.
///
/// The target is never left partially written.
pub fn write_file_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, data).map_err(|e| Error::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::scalar::infer;

    fn string(s: &str) -> Document {
        Document::Scalar(Scalar::String(s.to_string()))
    }

    fn mapping(entries: Vec<(&str, Document)>) -> Document {
        Document::Mapping(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_quote_plain_strings() {
        assert_eq!(quote_string("hello"), "hello");
        assert_eq!(quote_string("Good morning!"), "Good morning!");
        assert_eq!(quote_string("a-b_c.d"), "a-b_c.d");
        assert_eq!(quote_string("http://example.com"), "http://example.com");
        assert_eq!(quote_string("-flag"), "-flag");
        assert_eq!(quote_string("grüße"), "grüße");
    }

    #[test]
    fn test_quote_comment_like_strings() {
        assert_eq!(quote_string("See ya # later"), "'See ya # later'");
        assert_eq!(quote_string("#hash"), "'#hash'");
        assert_eq!(quote_string("key: value"), "'key: value'");
        assert_eq!(quote_string("ends:"), "'ends:'");
    }

    #[test]
    fn test_quote_strings_that_look_typed() {
        for s in ["123.4E-12", "007", "true", "yes", "Off", "~", "null", "0x1F", "1_000", ".inf", "2024-01-15", "1:30"] {
            assert_eq!(quote_string(s), format!("'{}'", s), "for {:?}", s);
        }
    }

    #[test]
    fn test_quote_whitespace_and_empty() {
        assert_eq!(quote_string(""), "''");
        assert_eq!(quote_string(" lead"), "' lead'");
        assert_eq!(quote_string("trail "), "'trail '");
        assert_eq!(quote_string("- item"), "'- item'");
        assert_eq!(quote_string("-"), "'-'");
    }

    #[test]
    fn test_single_quotes_are_doubled() {
        assert_eq!(quote_string("'tis"), "'''tis'");
    }

    #[test]
    fn test_double_quote_control_characters() {
        assert_eq!(quote_string("two\nlines"), "\"two\\nlines\"");
        assert_eq!(quote_string("tab\there"), "\"tab\\there\"");
        assert_eq!(quote_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(quote_string("bell\u{7}"), "\"bell\\a\"");
        assert_eq!(quote_string("x\u{1}"), "\"x\\x01\"");
    }

    #[test]
    fn test_serialize_typed_scalars_unquoted() {
        let doc = mapping(vec![
            ("int", Document::Scalar(infer("8888"))),
            ("dec", Document::Scalar(infer("-0.98989898989898989898"))),
            ("bool", Document::Scalar(infer("true"))),
            ("big", Document::Scalar(infer("98989898989898989898989898989898"))),
        ]);
        assert_eq!(
            serialize_yaml(&doc, 2),
            "big: 98989898989898989898989898989898\nbool: true\ndec: -0.98989898989898989898\nint: 8888\n"
        );
    }

    #[test]
    fn test_serialize_nested_and_sequence() {
        let doc = mapping(vec![(
            "some",
            mapping(vec![
                ("property", Document::Sequence(vec![string("something"), string("something-else")])),
                ("thing", string("hello")),
            ]),
        )]);
        assert_eq!(
            serialize_yaml(&doc, 2),
            "some:\n  property:\n  - something\n  - something-else\n  thing: hello\n"
        );
    }

    #[test]
    fn test_serialize_sequence_of_mappings() {
        let doc = mapping(vec![(
            "servers",
            Document::Sequence(vec![
                mapping(vec![("host", string("a")), ("port", Document::Scalar(infer("1")))]),
                mapping(vec![("host", string("b"))]),
            ]),
        )]);
        assert_eq!(
            serialize_yaml(&doc, 2),
            "servers:\n- host: a\n  port: 1\n- host: b\n"
        );
    }

    #[test]
    fn test_serialize_nested_sequences() {
        let doc = mapping(vec![(
            "m",
            Document::Sequence(vec![Document::Sequence(vec![string("a"), string("b")]), string("c")]),
        )]);
        assert_eq!(serialize_yaml(&doc, 2), "m:\n- - a\n  - b\n- c\n");
    }

    #[test]
    fn test_serialize_custom_indent() {
        let doc = mapping(vec![("a", mapping(vec![("b", mapping(vec![("c", string("x"))]))]))]);
        assert_eq!(serialize_yaml(&doc, 4), "a:\n    b:\n        c: x\n");
    }

    #[test]
    fn test_serialize_zero_indent_still_nests() {
        let doc = mapping(vec![("a", mapping(vec![("b", string("1"))])), ("c", string("2"))]);
        assert_eq!(serialize_yaml(&doc, 0), "a:\n b: '1'\nc: '2'\n");
    }

    #[test]
    fn test_serialize_empty_root_and_empty_children() {
        assert_eq!(serialize_yaml(&Document::empty_mapping(), 2), "");
        let doc = mapping(vec![
            ("map", Document::empty_mapping()),
            ("seq", Document::Sequence(vec![])),
        ]);
        assert_eq!(serialize_yaml(&doc, 2), "map: {}\nseq: []\n");
    }

    #[test]
    fn test_serialize_quotes_keys() {
        let doc = mapping(vec![("0", string("zero")), ("a b", string("x")), ("true", string("y"))]);
        assert_eq!(serialize_yaml(&doc, 2), "'0': zero\na b: x\n'true': y\n");
    }

    #[test]
    fn test_serialized_yaml_reads_back() {
        let doc = mapping(vec![
            ("quoted", string("See ya # later")),
            ("lines", string("a\nb")),
            ("looks_numeric", string("123.4E-12")),
            ("empty", string("")),
        ]);
        let yaml = serialize_yaml(&doc, 2);
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["quoted"], serde_yaml::Value::String("See ya # later".into()));
        assert_eq!(value["lines"], serde_yaml::Value::String("a\nb".into()));
        assert_eq!(value["looks_numeric"], serde_yaml::Value::String("123.4E-12".into()));
        assert_eq!(value["empty"], serde_yaml::Value::String(String::new()));
    }

    #[test]
    fn test_join_documents() {
        let joined = join_documents(vec![Some("a=1\n".to_string()), Some("b=2\n".to_string())]);
        assert_eq!(joined, "a=1\n#---\nb=2\n");

        let joined = join_documents(vec![None, Some("a=1\n".to_string()), None]);
        assert_eq!(joined, "a=1\n#---\n");

        assert_eq!(join_documents(Vec::<Option<String>>::new()), "");
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/tmp/app.properties")),
            PathBuf::from("/tmp/app.properties.bak")
        );
    }

    #[test]
    fn test_write_file_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.yml");

        write_file_atomic(&target, b"a: 1\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a: 1\n");

        write_file_atomic(&target, b"a: 2\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a: 2\n");
        assert!(!dir.path().join("out.yml.tmp").exists());
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.properties");
        fs::write(&source, "a=1\n").unwrap();

        let backup = create_backup(&source).unwrap();
        assert_eq!(fs::read_to_string(backup).unwrap(), "a=1\n");
    }
}
