//! stylesync configuration (stylesync.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stylesync_theme::base_themes;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StyleSyncConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Ambient theme classification
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// Base theme name classified as light; every other name is dark
    #[serde(default = "default_light_sentinel")]
    pub light_sentinel: String,
}

fn default_light_sentinel() -> String {
    base_themes::LIGHT.to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            light_sentinel: default_light_sentinel(),
        }
    }
}

/// Style block rendering
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// CSS shown between the first request and the first response.
    /// Must be non-empty so the style element never collapses.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Class of the wrapping element
    #[serde(default = "default_container_class")]
    pub container_class: String,
}

fn default_placeholder() -> String {
    " ".to_string()
}

fn default_container_class() -> String {
    "styleSetter".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            container_class: default_container_class(),
        }
    }
}

/// Logging defaults for binaries
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl StyleSyncConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StyleSyncConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the injector cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme.light_sentinel.is_empty() {
            return Err(ConfigError::Invalid(
                "theme.light_sentinel must not be empty".to_string(),
            ));
        }
        if self.render.placeholder.is_empty() {
            return Err(ConfigError::Invalid(
                "render.placeholder must not be empty".to_string(),
            ));
        }
        if self.render.container_class.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "render.container_class must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = StyleSyncConfig::from_toml_str("").unwrap();

        assert_eq!(config, StyleSyncConfig::default());
        assert_eq!(config.theme.light_sentinel, "vscode-light");
        assert_eq!(config.render.placeholder, " ");
        assert_eq!(config.render.container_class, "styleSetter");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = StyleSyncConfig::from_toml_str(
            r#"
            [render]
            container_class = "notebook-styles"

            [log]
            level = "stylesync_core=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.container_class, "notebook-styles");
        assert_eq!(config.render.placeholder, " ");
        assert_eq!(config.log.level, "stylesync_core=debug");
    }

    #[test]
    fn test_empty_placeholder_rejected() {
        let err = StyleSyncConfig::from_toml_str("[render]\nplaceholder = \"\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let err = StyleSyncConfig::from_toml_str("[theme]\nlight_sentinel = \"\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = StyleSyncConfig::from_toml_str("[render\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_roundtrip_keeps_placeholder_space() {
        let text = StyleSyncConfig::default().to_toml().unwrap();

        let parsed = StyleSyncConfig::from_toml_str(&text).unwrap();

        assert_eq!(parsed.render.placeholder, " ");
    }

    #[test]
    fn test_missing_file() {
        let err = StyleSyncConfig::load(Path::new("/nonexistent/stylesync.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
