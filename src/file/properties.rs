//! Reading and writing the `.properties` format.
//!
//! Loading follows the line-oriented `java.util.Properties` grammar: `#` and
//! `!` comment lines, `=`, `:` or whitespace separators, backslash line
//! continuation and `\uXXXX` escapes. Repeated keys are kept, in order, as a
//! multi-valued entry instead of the last one silently winning.

use crate::document::flatten::FlatEntry;
use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Ordered multimap of unescaped keys to their values in file order.
pub type Properties = IndexMap<String, Vec<String>>;

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Parses properties text.
///
/// # Example
///
/// ```
/// use propyaml::file::properties::load;
///
/// let props = load("a=1\n# note\nb : two \\\n   words\na=3\n").unwrap();
/// assert_eq!(props["a"], vec!["1", "3"]);
/// assert_eq!(props["b"], vec!["two words"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::PropertiesSyntax`] for a malformed `\uXXXX` escape.
pub fn load(text: &str) -> Result<Properties> {
    let mut props = Properties::new();
    for (line_no, line) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&line);
        let key = unescape(raw_key, line_no)?;
        let value = unescape(raw_value, line_no)?;
        props.entry(key).or_default().push(value);
    }
    Ok(props)
}

/// Joins continued lines and drops blank and comment lines.
///
/// Each logical line is paired with the 1-based number of the natural line
/// it starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, natural) in normalized.split('\n').enumerate() {
        let trimmed = natural.trim_start_matches(WHITESPACE);
        let continues = trailing_backslashes(trimmed) % 2 == 1;
        let content = if continues {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };

        match current.as_mut() {
            Some((_, buffer)) => buffer.push_str(content),
            None => {
                if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
                    continue;
                }
                current = Some((idx + 1, content.to_string()));
            }
        }

        if !continues {
            lines.extend(current.take());
        }
    }
    lines.extend(current);
    lines
}

fn trailing_backslashes(s: &str) -> usize {
    s.bytes().rev().take_while(|&b| b == b'\\').count()
}

/// Splits a logical line at the first unescaped separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                has_separator = true;
                break;
            }
            c if WHITESPACE.contains(&c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut value_start = if has_separator { key_end + 1 } else { key_end };
    for c in line[value_start.min(line.len())..].chars() {
        if WHITESPACE.contains(&c) {
            value_start += c.len_utf8();
        } else if !has_separator && (c == '=' || c == ':') {
            has_separator = true;
            value_start += 1;
        } else {
            break;
        }
    }

    let value_start = value_start.min(line.len());
    (&line[..key_end], &line[value_start..])
}

/// Resolves backslash escapes.
fn unescape(raw: &str, line: usize) -> Result<String> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('f') => result.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| Error::PropertiesSyntax {
                        line,
                        message: format!("malformed \\uxxxx encoding '\\u{}'", hex),
                    })?;
                result.push(code);
            }
            Some(other) => result.push(other),
            None => {}
        }
    }

    Ok(result)
}

/// Renders entries as `key=value` lines.
///
/// # Example
///
/// ```
/// use propyaml::document::flatten::FlatEntry;
/// use propyaml::file::properties::store;
/// use propyaml::path::Parser;
///
/// let entries = vec![FlatEntry {
///     path: Parser::parse("greeting").unwrap(),
///     value: "Good morning!".to_string(),
/// }];
/// assert_eq!(store(&entries), "greeting=Good morning\\!\n");
/// ```
pub fn store(entries: &[FlatEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&escape_key(&entry.key()));
        out.push('=');
        out.push_str(&escape_value(&entry.value));
        out.push('\n');
    }
    out
}

/// Escapes a key. Every space is escaped.
pub fn escape_key(key: &str) -> String {
    escape(key, true)
}

/// Escapes a value. Only a leading space is escaped.
pub fn escape_value(value: &str) -> String {
    escape(value, false)
}

fn escape(s: &str, escape_all_spaces: bool) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.chars().enumerate() {
        match c {
            ' ' if i == 0 || escape_all_spaces => result.push_str("\\ "),
            '\\' => result.push_str("\\\\"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\x0c' => result.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                result.push('\\');
                result.push(c);
            }
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => result.push(c),
        }
    }

    result
}
