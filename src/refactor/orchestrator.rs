//! Sequences a conversion: precondition checks, the conversion itself, and
//! packaging of the resulting change.
//!
//! ```text
//! Initial -> CheckedPreconditions -> Converted -> ChangeBuilt -> Applied
//!        \                       \            \
//!         `----------------------`------------`--> Aborted
//! ```
//!
//! Every step returns the accumulated [`ConversionStatus`] so it can be shown
//! before anything is written.

use super::change::{Change, ChangeKind};
use super::convert::{convert, Direction};
use super::report;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::file::comments::{properties_has_comments, yaml_has_comments};
use crate::file::workspace::Workspace;
use crate::status::{ConversionStatus, Diagnostic, Severity};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Conversion settings, usually taken from [`Config`] and command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub indent_size: usize,
    pub yaml_extension: String,
    pub report_header: bool,
    pub replace_source: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options::from(&Config::default())
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Options {
            indent_size: config.indent_size,
            yaml_extension: config.yaml_extension.clone(),
            report_header: config.report_header,
            replace_source: config.replace_source,
        }
    }
}

/// Lifecycle of one orchestrated conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initial,
    CheckedPreconditions,
    Converted,
    ChangeBuilt,
    Applied,
    Aborted,
}

impl State {
    pub fn name(self) -> &'static str {
        match self {
            State::Initial => "INITIAL",
            State::CheckedPreconditions => "CHECKED_PRECONDITIONS",
            State::Converted => "CONVERTED",
            State::ChangeBuilt => "CHANGE_BUILT",
            State::Applied => "APPLIED",
            State::Aborted => "ABORTED",
        }
    }
}

/// Drives a single file conversion against a [`Workspace`].
pub struct ConversionOrchestrator<'w, W: Workspace> {
    workspace: &'w W,
    source: PathBuf,
    target: PathBuf,
    direction: Direction,
    options: Options,
    state: State,
    status: ConversionStatus,
    source_text: Option<String>,
    converted: Option<String>,
}

impl<'w, W: Workspace> ConversionOrchestrator<'w, W> {
    /// Creates an orchestrator; the target name is derived from the source.
    pub fn new(
        workspace: &'w W,
        source: impl Into<PathBuf>,
        direction: Direction,
        options: Options,
    ) -> Self {
        let source = source.into();
        let target = direction.target_path(&source, &options.yaml_extension);
        Self {
            workspace,
            source,
            target,
            direction,
            options,
            state: State::Initial,
            status: ConversionStatus::ok(),
            source_text: None,
            converted: None,
        }
    }

    /// Overrides the computed target name.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn status(&self) -> &ConversionStatus {
        &self.status
    }

    /// Converted text, available once final conditions have been checked.
    pub fn converted_text(&self) -> Option<&str> {
        self.converted.as_deref()
    }

    /// Verifies the source is readable and the target name is free.
    ///
    /// Either violation is FATAL and aborts the conversion.
    pub fn check_initial_conditions(&mut self) -> Result<&ConversionStatus> {
        self.expect_state(State::Initial)?;

        let text = if self.workspace.exists(&self.source) {
            self.workspace.read(&self.source).ok()
        } else {
            None
        };
        let Some(text) = text else {
            let message = format!(
                "'{}' does not exist or is not accessible",
                self.source.display()
            );
            return Ok(self.abort_with(Diagnostic::fatal(message)));
        };

        if self.workspace.exists(&self.target) {
            let message = format!("'{}' already exists", self.target.display());
            return Ok(self.abort_with(Diagnostic::fatal(message)));
        }

        debug!(source = %self.source.display(), target = %self.target.display(), "preconditions hold");
        self.source_text = Some(text);
        self.state = State::CheckedPreconditions;
        Ok(&self.status)
    }

    /// Reports comment loss, then runs the conversion and merges its status.
    pub fn check_final_conditions(&mut self) -> Result<&ConversionStatus> {
        self.expect_state(State::CheckedPreconditions)?;
        let text = self.source_text.take().unwrap_or_default();

        let has_comments = match self.direction {
            Direction::PropertiesToYaml => properties_has_comments(&text),
            Direction::YamlToProperties => yaml_has_comments(&text),
        };
        if has_comments {
            let name = self
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.source.display().to_string());
            self.push(Diagnostic::warning(format!(
                "The file '{}' has comments, which will be lost in the refactoring!",
                name
            )));
        }

        let converted = convert(self.direction, &text, self.options.indent_size);
        for diagnostic in converted.status.entries() {
            self.push(diagnostic.clone());
        }

        if self.status.has_fatal() {
            self.state = State::Aborted;
        } else {
            self.converted = Some(converted.text);
            self.state = State::Converted;
        }
        debug!(severity = %self.status.severity(), "conversion finished");
        Ok(&self.status)
    }

    /// Runs both checks; stops after the first if it aborted.
    pub fn check_all_conditions(&mut self) -> Result<&ConversionStatus> {
        self.check_initial_conditions()?;
        if self.state == State::Aborted {
            return Ok(&self.status);
        }
        self.check_final_conditions()
    }

    /// Packages the converted text as a [`Change`].
    ///
    /// # Errors
    ///
    /// [`Error::Fatal`] if the status is FATAL, [`Error::InvalidState`] if
    /// final conditions have not been checked.
    pub fn create_change(&mut self) -> Result<Change> {
        if self.status.has_fatal() {
            let reason = self
                .status
                .messages(Severity::Fatal)
                .next()
                .unwrap_or("fatal status")
                .to_string();
            return Err(Error::Fatal(reason));
        }
        self.expect_state(State::Converted)?;

        let mut content = if self.options.report_header {
            report::header(&self.status)
        } else {
            String::new()
        };
        content.push_str(self.converted.as_deref().unwrap_or_default());

        let kind = if self.options.replace_source {
            ChangeKind::ReplaceAndRename
        } else {
            ChangeKind::CreateTarget
        };

        self.state = State::ChangeBuilt;
        Ok(Change {
            source: self.source.clone(),
            target: self.target.clone(),
            content,
            kind,
        })
    }

    /// Commits a change built by [`Self::create_change`].
    pub fn apply(&mut self, change: &Change) -> Result<()> {
        self.expect_state(State::ChangeBuilt)?;
        self.workspace.apply(change)?;
        info!(change = %change.describe(), "change applied");
        self.state = State::Applied;
        Ok(())
    }

    /// Abandons the conversion without writing anything.
    pub fn abort(&mut self) {
        if self.state != State::Applied {
            self.state = State::Aborted;
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity >= Severity::Error {
            warn!(severity = %diagnostic.severity, "{}", diagnostic.message);
        }
        let status = std::mem::take(&mut self.status);
        self.status = status.with(diagnostic);
    }

    fn abort_with(&mut self, diagnostic: Diagnostic) -> &ConversionStatus {
        self.push(diagnostic);
        self.state = State::Aborted;
        &self.status
    }

    fn expect_state(&self, expected: State) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }
}
