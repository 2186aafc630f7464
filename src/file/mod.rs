//! File formats and file system access.
//!
//! Loading and storing `.properties` text, loading YAML, rendering YAML,
//! comment detection, and the workspace that changes are applied to.

pub mod comments;
pub mod loader;
pub mod properties;
pub mod saver;
pub mod workspace;
