//! Segment and path types for property keys.

use std::fmt;

/// A segment in a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Map key (`name` or `.name`)
    Name(String),
    /// Sequence position (`[0]`)
    Index(usize),
}

/// An ordered sequence of segments identifying a location in a document.
///
/// The `Display` implementation renders the canonical key form, so that
/// `Parser::parse(s)?.to_string() == s` for every key the parser accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    /// Creates a new path with the given segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the first segment, if any.
    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Returns the path without its first `n` segments.
    pub fn drop_first(&self, n: usize) -> PropertyPath {
        let start = n.min(self.segments.len());
        PropertyPath::new(self.segments[start..].to_vec())
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: Segment) -> PropertyPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        PropertyPath::new(segments)
    }

    /// Shorthand for appending a `Name` segment.
    pub fn child_name(&self, name: &str) -> PropertyPath {
        self.child(Segment::Name(name.to_string()))
    }

    /// Shorthand for appending an `Index` segment.
    pub fn child_index(&self, index: usize) -> PropertyPath {
        self.child(Segment::Index(index))
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Name(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for PropertyPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}
