//! Where source files are read from and changes are written to.
//!
//! The orchestrator only talks to a [`Workspace`]. [`FsWorkspace`] works on
//! the real file system; [`MemoryWorkspace`] keeps files in memory, which is
//! what tests and dry runs use.

use super::loader::read_source;
use super::saver::{create_backup, write_file_atomic};
use crate::error::{Error, Result};
use crate::refactor::change::{Change, ChangeKind};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resource access needed by a conversion.
pub trait Workspace {
    /// True if `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the full text of `path`.
    fn read(&self, path: &Path) -> Result<String>;

    /// Commits `change`.
    fn apply(&self, change: &Change) -> Result<()>;
}

/// The local file system.
#[derive(Debug, Clone, Default)]
pub struct FsWorkspace {
    create_backup: bool,
}

impl FsWorkspace {
    pub fn new(create_backup: bool) -> Self {
        Self { create_backup }
    }
}

impl Workspace for FsWorkspace {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<String> {
        read_source(path)
    }

    /// Writes atomically. For [`ChangeKind::ReplaceAndRename`] the source is
    /// rewritten in place and then renamed, so no state exists where both or
    /// neither file is present.
    ///
    /// An existing target, of any file type, is never replaced.
    fn apply(&self, change: &Change) -> Result<()> {
        if fs::symlink_metadata(&change.target).is_ok() {
            return Err(Error::TargetExists(change.target.clone()));
        }

        if self.create_backup && change.source.is_file() {
            let backup = create_backup(&change.source)?;
            debug!(backup = %backup.display(), "backup created");
        }

        match change.kind {
            ChangeKind::ReplaceAndRename => {
                write_file_atomic(&change.source, change.content.as_bytes())?;
                fs::rename(&change.source, &change.target)
                    .map_err(|e| Error::io(&change.target, e))?;
            }
            ChangeKind::CreateTarget => {
                write_file_atomic(&change.target, change.content.as_bytes())?;
            }
        }
        Ok(())
    }
}

/// In-memory files keyed by path.
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), content.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl Workspace for MemoryWorkspace {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.contents(path)
            .ok_or_else(|| Error::io(path, io::Error::from(io::ErrorKind::NotFound)))
    }

    fn apply(&self, change: &Change) -> Result<()> {
        let mut files = self.files.borrow_mut();
        if files.contains_key(&change.target) {
            return Err(Error::TargetExists(change.target.clone()));
        }
        if change.kind == ChangeKind::ReplaceAndRename {
            files.remove(&change.source);
        }
        files.insert(change.target.clone(), change.content.clone());
        Ok(())
    }
}
