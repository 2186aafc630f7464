//! The single atomic operation a conversion produces.

use std::path::{Path, PathBuf};

/// How a change is committed to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeKind {
    /// Replace the source's content, then rename it to the target name
    #[default]
    ReplaceAndRename,
    /// Create the target with the converted content; leave the source alone
    CreateTarget,
}

/// A packaged rewrite, ready to be applied by a [`crate::file::workspace::Workspace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub source: PathBuf,
    pub target: PathBuf,
    pub content: String,
    pub kind: ChangeKind,
}

impl Change {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// One-line human readable summary.
    pub fn describe(&self) -> String {
        match self.kind {
            ChangeKind::ReplaceAndRename => format!(
                "rewrite '{}' and rename it to '{}'",
                self.source.display(),
                self.target.display()
            ),
            ChangeKind::CreateTarget => format!(
                "create '{}' from '{}'",
                self.target.display(),
                self.source.display()
            ),
        }
    }
}
