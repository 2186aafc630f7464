//! Configuration for propyaml.
//!
//! Settings are read from `~/.config/propyaml/config.toml`. Every field is
//! optional in the file; missing fields take their defaults, and a missing or
//! unreadable file yields the default configuration. Command-line flags
//! override whatever is loaded here.
//!
//! # Example
//!
//! ```
//! use propyaml::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert_eq!(config.yaml_extension, "yml");
//!
//! let custom = Config {
//!     indent_size: 4,
//!     ..Config::default()
//! };
//! assert!(custom.replace_source);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the propyaml converter.
///
/// # Fields
///
/// * `indent_size` - Spaces per YAML indentation level (default: 2)
/// * `yaml_extension` - Extension given to YAML targets (default: "yml")
/// * `create_backup` - Copy the source to `<name>.bak` before applying (default: false)
/// * `replace_source` - Rewrite and rename the source instead of creating a new file (default: true)
/// * `report_header` - Prepend a comment block listing errors and warnings (default: false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Spaces per YAML indentation level, at least 1
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Extension for YAML targets, without the dot
    #[serde(default = "default_yaml_extension")]
    pub yaml_extension: String,

    /// Create .bak files before applying a change
    #[serde(default)]
    pub create_backup: bool,

    /// Rewrite and rename the source (true) or create the target next to it (false)
    #[serde(default = "default_replace_source")]
    pub replace_source: bool,

    /// Prepend the conversion report as a comment block
    #[serde(default)]
    pub report_header: bool,
}

fn default_indent_size() -> usize {
    2
}

fn default_yaml_extension() -> String {
    "yml".to_string()
}

fn default_replace_source() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            yaml_extension: default_yaml_extension(),
            create_backup: false,
            replace_source: default_replace_source(),
            report_header: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/propyaml/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("propyaml");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// is missing or not valid TOML.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str::<Self>(&contents)
                .map(Self::validated)
                .unwrap_or_else(|err| {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                    Self::default()
                }),
            Err(_) => Self::default(),
        }
    }

    /// Replaces out-of-range values with their defaults.
    fn validated(mut self) -> Self {
        if self.indent_size == 0 {
            tracing::warn!("indent_size must be at least 1, using {}", default_indent_size());
            self.indent_size = default_indent_size();
        }
        self
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_source_default() {
        let config = Config::default();
        assert!(config.replace_source);
        assert!(!config.create_backup);
        assert!(!config.report_header);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("indent_size = 4\n").unwrap();
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.yaml_extension, "yml");
        assert!(config.replace_source);
    }
}
