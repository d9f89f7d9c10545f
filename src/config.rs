//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/famtree/famtree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `FAMTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for famtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Colored terminal output (default: true)
    pub color: bool,
    /// Separator printed between members of an ancestry chain (default: " <- ")
    pub ancestry_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            ancestry_separator: " <- ".into(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub color: Option<bool>,
    pub ancestry_separator: Option<String>,
}

/// Template written by `famtree config init`.
pub const CONFIG_TEMPLATE: &str = r#"# famtree configuration
#
# Colored terminal output
color = true

# Separator between members of an ancestry chain
ancestry_separator = " <- "
"#;

/// Get the XDG config directory for famtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "famtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("famtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            color: overlay.color.unwrap_or(self.color),
            ancestry_separator: overlay
                .ancestry_separator
                .clone()
                .unwrap_or_else(|| self.ancestry_separator.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), explicit)
    }

    /// Same as [`Settings::load`] with the global file location supplied by the caller.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply FAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FAMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("color") {
            settings.color = val;
        }
        if let Ok(val) = config.get_string("ancestry_separator") {
            settings.ancestry_separator = val;
        }

        Ok(settings)
    }

    /// Serialize to TOML for `famtree config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let raw: RawSettings = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }

    #[test]
    fn overlay_only_replaces_specified_fields() {
        let raw = RawSettings {
            color: Some(false),
            ancestry_separator: None,
        };
        let merged = Settings::default().merge_with(&raw);
        assert!(!merged.color);
        assert_eq!(merged.ancestry_separator, " <- ");
    }
}
