//! Conversion status: the diagnostics surfaced to the user before a change
//! is committed.
//!
//! Diagnostics are plain values. Components return the ones they produce and
//! callers concatenate them; nothing mutates a shared status object.

use serde::Serialize;
use std::fmt;

/// Severity of a single diagnostic, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Clean conversion
    #[default]
    Ok,
    /// Lossy but proceeding (comments dropped, values merged, shapes merged)
    Warning,
    /// A contribution was dropped; output is still produced
    Error,
    /// The operation is refused; no output
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        f.write_str(label)
    }
}

/// One finding of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered list of diagnostics; the overall severity is the maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStatus {
    severity: Severity,
    entries: Vec<Diagnostic>,
}

impl ConversionStatus {
    /// A clean status with no diagnostics.
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn from_diagnostics(entries: Vec<Diagnostic>) -> Self {
        let severity = entries
            .iter()
            .map(|d| d.severity)
            .max()
            .unwrap_or(Severity::Ok);
        Self { severity, entries }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    pub fn has_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Messages of every diagnostic with exactly the given severity, in order.
    pub fn messages(&self, severity: Severity) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(move |d| d.severity == severity)
            .map(|d| d.message.as_str())
    }

    /// Returns this status followed by `other`.
    #[must_use]
    pub fn merge(self, other: ConversionStatus) -> ConversionStatus {
        let mut entries = self.entries;
        entries.extend(other.entries);
        ConversionStatus::from_diagnostics(entries)
    }

    /// Returns this status with one more diagnostic appended.
    #[must_use]
    pub fn with(self, diagnostic: Diagnostic) -> ConversionStatus {
        self.merge(ConversionStatus::from_diagnostics(vec![diagnostic]))
    }
}

impl From<Vec<Diagnostic>> for ConversionStatus {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Self::from_diagnostics(entries)
    }
}

impl FromIterator<Diagnostic> for ConversionStatus {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self::from_diagnostics(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_is_ok() {
        let status = ConversionStatus::ok();
        assert!(status.is_ok());
        assert_eq!(status.severity(), Severity::Ok);
        assert!(status.entries().is_empty());
    }

    #[test]
    fn test_severity_is_maximum() {
        let status = ConversionStatus::from_diagnostics(vec![
            Diagnostic::warning("w"),
            Diagnostic::error("e"),
            Diagnostic::warning("w2"),
        ]);
        assert_eq!(status.severity(), Severity::Error);
        assert!(!status.has_fatal());
    }

    #[test]
    fn test_merge_keeps_order() {
        let first = ConversionStatus::from_diagnostics(vec![Diagnostic::warning("a")]);
        let second =
            ConversionStatus::from_diagnostics(vec![Diagnostic::fatal("b"), Diagnostic::error("c")]);
        let merged = first.merge(second);

        let messages: Vec<&str> = merged.entries().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert!(merged.has_fatal());
    }

    #[test]
    fn test_messages_filter_by_severity() {
        let status = ConversionStatus::ok()
            .with(Diagnostic::error("dropped"))
            .with(Diagnostic::warning("merged"));
        assert_eq!(status.messages(Severity::Error).collect::<Vec<_>>(), vec!["dropped"]);
        assert_eq!(status.messages(Severity::Warning).collect::<Vec<_>>(), vec!["merged"]);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_status_serializes_to_json() {
        let status = ConversionStatus::ok().with(Diagnostic::warning("comments"));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["entries"][0]["message"], "comments");
    }
}
