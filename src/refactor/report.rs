//! Human readable renderings of a [`ConversionStatus`].

use crate::status::{ConversionStatus, Severity};

/// Comment block listing errors and warnings, for the top of the output.
///
/// Empty when the status has neither. Lines start with `#`, so the block is
/// a comment in both YAML and properties files.
///
/// # Example
///
/// ```
/// use propyaml::refactor::report::header;
/// use propyaml::status::{ConversionStatus, Diagnostic};
///
/// let status = ConversionStatus::ok().with(Diagnostic::warning("values merged"));
/// assert_eq!(header(&status), "# Conversion report\n# Warnings:\n# - values merged\n");
/// assert_eq!(header(&ConversionStatus::ok()), "");
/// ```
pub fn header(status: &ConversionStatus) -> String {
    let errors: Vec<&str> = status.messages(Severity::Error).collect();
    let warnings: Vec<&str> = status.messages(Severity::Warning).collect();
    if errors.is_empty() && warnings.is_empty() {
        return String::new();
    }

    let mut out = String::from("# Conversion report\n");
    for (title, messages) in [("Errors", &errors), ("Warnings", &warnings)] {
        if messages.is_empty() {
            continue;
        }
        out.push_str(&format!("# {}:\n", title));
        for message in messages.iter() {
            // Keep multi-line messages inside the comment block
            out.push_str(&format!("# - {}\n", message.replace('\n', "\n#   ")));
        }
    }
    out
}

/// Plain text summary: one `SEVERITY: message` line per diagnostic, then the
/// overall severity.
pub fn render_text(status: &ConversionStatus) -> String {
    let mut out = String::new();
    for diagnostic in status.entries() {
        out.push_str(&format!("{}\n", diagnostic));
    }
    out.push_str(&format!("Status: {}\n", status.severity()));
    out
}
