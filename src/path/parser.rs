//! Property key parser.

use super::ast::{PropertyPath, Segment};
use super::error::PathError;

/// Parser for flat property keys.
///
/// Input keys are expected to be unescaped already (`\:` and `\=` resolved by
/// the properties tokenizer).
pub struct Parser {
    input: Vec<char>,
    position: usize,
}

impl Parser {
    /// Creates a new parser for the given key.
    pub fn new(key: &str) -> Self {
        Self {
            input: key.chars().collect(),
            position: 0,
        }
    }

    /// Parses the key into a PropertyPath.
    pub fn parse(key: &str) -> Result<PropertyPath, PathError> {
        let mut parser = Parser::new(key);
        parser.parse_path()
    }

    fn parse_path(&mut self) -> Result<PropertyPath, PathError> {
        let mut segments = Vec::new();
        // `None` right after a closing bracket: only '.', '[' or the end may follow.
        let mut pending: Option<String> = Some(String::new());

        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.next();
                    if let Some(name) = pending.take() {
                        segments.push(Segment::Name(name));
                    }
                    pending = Some(String::new());
                }
                '[' => {
                    if let Some(name) = pending.take() {
                        // A key may start with an index: `[0].a`
                        if !(name.is_empty() && segments.is_empty()) {
                            segments.push(Segment::Name(name));
                        }
                    }
                    segments.push(self.parse_index()?);
                    match self.peek() {
                        None | Some('.') | Some('[') => {}
                        Some(other) => {
                            return Err(PathError::UnexpectedChar {
                                position: self.position,
                                found: other,
                                expected: "'.', '[' or end of key".to_string(),
                            })
                        }
                    }
                }
                _ => {
                    self.next();
                    match pending.as_mut() {
                        Some(name) => name.push(ch),
                        None => {
                            return Err(PathError::UnexpectedChar {
                                position: self.position - 1,
                                found: ch,
                                expected: "'.', '[' or end of key".to_string(),
                            })
                        }
                    }
                }
            }
        }

        if let Some(name) = pending {
            segments.push(Segment::Name(name));
        }

        Ok(PropertyPath::new(segments))
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Expects a specific character and advances, or returns an error.
    fn expect(&mut self, expected: char) -> Result<(), PathError> {
        let pos = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(PathError::UnexpectedChar {
                position: pos,
                found: ch,
                expected: format!("'{}'", expected),
            }),
            None => Err(PathError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    /// Parses `[digits]`.
    fn parse_index(&mut self) -> Result<Segment, PathError> {
        self.expect('[')?;
        let start = self.position;
        let mut digits = String::new();
        loop {
            match self.peek() {
                Some(']') => break,
                Some(ch) if ch.is_ascii_digit() => {
                    digits.push(ch);
                    self.next();
                }
                Some(ch) => {
                    return Err(PathError::UnexpectedChar {
                        position: self.position,
                        found: ch,
                        expected: "digit or ']'".to_string(),
                    })
                }
                None => {
                    return Err(PathError::UnexpectedEnd {
                        expected: "']'".to_string(),
                    })
                }
            }
        }
        if digits.is_empty() {
            return Err(PathError::UnexpectedChar {
                position: self.position,
                found: ']',
                expected: "digit".to_string(),
            });
        }
        self.expect(']')?;

        // Only canonical decimals so that rendering gives back the same key.
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(PathError::InvalidIndex {
                position: start,
                digits,
            });
        }
        digits
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| PathError::InvalidIndex {
                position: start,
                digits,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Segment {
        Segment::Name(s.to_string())
    }

    #[test]
    fn test_parse_single_name() {
        let path = Parser::parse("server").unwrap();
        assert_eq!(path.segments(), &[name("server")]);
    }

    #[test]
    fn test_parse_dotted() {
        let path = Parser::parse("some.other.thing").unwrap();
        assert_eq!(
            path.segments(),
            &[name("some"), name("other"), name("thing")]
        );
    }

    #[test]
    fn test_parse_index_then_name() {
        let path = Parser::parse("some.thing[1].b").unwrap();
        assert_eq!(
            path.segments(),
            &[name("some"), name("thing"), Segment::Index(1), name("b")]
        );
    }

    #[test]
    fn test_parse_nested_indices() {
        let path = Parser::parse("matrix[0][12]").unwrap();
        assert_eq!(
            path.segments(),
            &[name("matrix"), Segment::Index(0), Segment::Index(12)]
        );
    }

    #[test]
    fn test_parse_leading_index() {
        let path = Parser::parse("[3].x").unwrap();
        assert_eq!(path.segments(), &[Segment::Index(3), name("x")]);
    }

    #[test]
    fn test_parse_empty_key() {
        let path = Parser::parse("").unwrap();
        assert_eq!(path.segments(), &[name("")]);
    }

    #[test]
    fn test_parse_keeps_non_ascii_and_dashes() {
        let path = Parser::parse("my.grüße-key_2").unwrap();
        assert_eq!(path.segments(), &[name("my"), name("grüße-key_2")]);
    }

    #[test]
    fn test_parse_rejects_text_after_bracket() {
        let err = Parser::parse("a[0]b").unwrap_err();
        assert!(matches!(
            err,
            PathError::UnexpectedChar { found: 'b', position: 4, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_non_digit_index() {
        assert!(matches!(
            Parser::parse("a[x]"),
            Err(PathError::UnexpectedChar { found: 'x', .. })
        ));
        assert!(matches!(
            Parser::parse("a[]"),
            Err(PathError::UnexpectedChar { found: ']', .. })
        ));
        assert!(matches!(
            Parser::parse("a[-1]"),
            Err(PathError::UnexpectedChar { found: '-', .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unclosed_bracket() {
        assert!(matches!(
            Parser::parse("a[12"),
            Err(PathError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_leading_zero_index() {
        assert!(matches!(
            Parser::parse("a[01]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(Parser::parse("a[0]").is_ok());
    }

    #[test]
    fn test_render_round_trip() {
        let keys = [
            "",
            "a",
            "a.b.c",
            "a[0]",
            "a[0].b",
            "a[0][1]",
            "[0]",
            "[0].a",
            "a.",
            ".a",
            "a..b",
            "a.[0]",
            "spring.datasource.hikari.maximum-pool-size",
        ];
        for key in keys {
            let path = Parser::parse(key).unwrap();
            assert_eq!(path.to_string(), key, "round trip failed for {:?}", key);
        }
    }
}
