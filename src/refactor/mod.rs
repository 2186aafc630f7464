//! File-level conversion: checks, conversion, and the resulting change.
//!
//! ```no_run
//! use propyaml::file::workspace::FsWorkspace;
//! use propyaml::refactor::{ConversionOrchestrator, Direction, Options};
//!
//! let workspace = FsWorkspace::new(false);
//! let mut conversion = ConversionOrchestrator::new(
//!     &workspace,
//!     "application.properties",
//!     Direction::PropertiesToYaml,
//!     Options::default(),
//! );
//! let status = conversion.check_all_conditions().unwrap().clone();
//! if !status.has_fatal() {
//!     let change = conversion.create_change().unwrap();
//!     conversion.apply(&change).unwrap();
//! }
//! ```

pub mod change;
pub mod convert;
pub mod orchestrator;
pub mod report;

pub use change::{Change, ChangeKind};
pub use convert::{convert, Converted, Direction};
pub use orchestrator::{ConversionOrchestrator, Options, State};
