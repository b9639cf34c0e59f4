//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/marknest/marknest.toml`
//! 3. Explicit config file passed by the caller
//! 4. Environment variables: `MARKNEST__*`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{Document, DEFAULT_MAX_DEPTH};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Word tagging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TaggingConfig {
    /// Tag of the element wrapped around each word
    pub marker_tag: String,
    /// Tags whose subtrees are left untokenized
    pub excluded_tags: Vec<String>,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            marker_tag: "w".into(),
            excluded_tags: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum depth any recursive tree walk may reach
    pub max_depth: usize,
    pub tagging: TaggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            tagging: TaggingConfig::default(),
        }
    }
}

/// Get the XDG config directory for marknest.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "marknest").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("marknest.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(config_file, None)
    }

    /// Same as [`Settings::load`], reading `MARKNEST__*` variables from `env`
    /// instead of the process environment when given.
    #[instrument(level = "debug")]
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("max_depth", i64::try_from(defaults.max_depth).unwrap_or(i64::MAX))
            .map_err(config_err)?
            .set_default("tagging.marker_tag", defaults.tagging.marker_tag.clone())
            .map_err(config_err)?
            .set_default(
                "tagging.excluded_tags",
                defaults.tagging.excluded_tags.clone(),
            )
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("MARKNEST")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tagging.excluded_tags")
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_depth == 0 {
            return Err(SettingsError::Invalid {
                field: "max_depth",
                reason: "must be greater than zero".into(),
            });
        }
        if self.tagging.marker_tag.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "tagging.marker_tag",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# marknest configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/marknest/marknest.toml
#   File:   explicit path given by the host application
#   Env:    MARKNEST__* environment variables (e.g. MARKNEST__MAX_DEPTH)

# Maximum depth reached by recursive walks (copies, range deletion, tagging)
# max_depth = 512

[tagging]
# Element wrapped around each word
# marker_tag = "w"

# Subtrees rooted at these tags are not tokenized
# (env: MARKNEST__TAGGING__EXCLUDED_TAGS=code,pre)
# excluded_tags = ["code", "pre"]
"#
        .to_string()
    }
}

impl Document {
    pub fn with_settings(settings: &Settings) -> Self {
        Document::with_max_depth(settings.max_depth)
    }
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_validated_then_ok() {
        let settings = Settings::default();
        settings.validate().expect("defaults are valid");
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.tagging.marker_tag, "w");
    }

    #[test]
    fn given_zero_depth_when_validated_then_invalid() {
        let settings = Settings {
            max_depth: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "max_depth", .. })
        ));
    }

    #[test]
    fn given_settings_when_serialized_then_toml_contains_sections() {
        let toml = Settings::default().to_toml().expect("serialize");
        assert!(toml.contains("max_depth = 512"));
        assert!(toml.contains("[tagging]"));
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).expect("parse template");
        assert_eq!(parsed, Settings::default());
    }
}
