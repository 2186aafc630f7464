//! Comment detection.
//!
//! Neither conversion direction can carry comments over, so the source is
//! scanned for them up front and the loss is reported before anything is
//! written.

use once_cell::sync::Lazy;
use regex::Regex;

static PROPERTIES_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t\x0c]*[#!]").expect("valid comment regex"));

/// True if any line of a properties file is a comment line.
///
/// Continuation lines are not considered: a `#` that starts a continued
/// value line is still reported, which can only overstate the loss.
pub fn properties_has_comments(text: &str) -> bool {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    PROPERTIES_COMMENT.is_match(&normalized)
}

/// True if YAML text contains a comment.
///
/// A `#` starts a comment at the beginning of a line or after whitespace,
/// outside quoted scalars and block scalar bodies. Quoted scalars may span
/// several lines.
pub fn yaml_has_comments(text: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut block_indent: Option<usize> = None;

    for line in text.lines() {
        let indent = line.len() - line.trim_start_matches(' ').len();

        if quote.is_none() {
            if let Some(parent) = block_indent {
                if line.trim().is_empty() || indent > parent {
                    continue;
                }
                block_indent = None;
            }
        }

        match scan_line(line, &mut quote) {
            Some(LineScan::Comment) => return true,
            Some(LineScan::BlockScalar) => block_indent = Some(indent),
            None => {}
        }
    }
    false
}

enum LineScan {
    Comment,
    BlockScalar,
}

/// Looks for a comment or a block scalar header on one line. `quote` holds
/// the open quote character, if any, carried over from the previous line.
fn scan_line(line: &str, quote: &mut Option<char>) -> Option<LineScan> {
    let mut previous: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match *quote {
            Some('\'') => {
                if c == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        *quote = None;
                    }
                }
            }
            Some(_) => match c {
                '\\' => {
                    chars.next();
                }
                '"' => *quote = None,
                _ => {}
            },
            None => match c {
                '#' if previous.map_or(true, char::is_whitespace) => {
                    return Some(LineScan::Comment);
                }
                '\'' | '"' if previous.map_or(true, |p| p.is_whitespace() || "[{,:-".contains(p)) => {
                    *quote = Some(c);
                }
                '|' | '>' if previous.map_or(true, char::is_whitespace) => {
                    let rest: String = chars.clone().collect();
                    let header = rest.trim();
                    let header = header
                        .split_once('#')
                        .map_or(header, |(h, _)| h)
                        .trim();
                    if header.chars().all(|h| h.is_ascii_digit() || h == '+' || h == '-') {
                        if rest.contains(" #") || rest.trim_start().starts_with('#') {
                            return Some(LineScan::Comment);
                        }
                        return Some(LineScan::BlockScalar);
                    }
                }
                _ => {}
            },
        }
        previous = Some(c);
    }
    None
}
