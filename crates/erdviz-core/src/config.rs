//! Configuration schema (erdviz.toml)

use crate::options::{LayoutDirection, RenderOptions, ViewMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// SQL dialect configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectSetting {
    /// Detect from the DDL text
    #[default]
    Auto,

    /// MySQL / MariaDB
    Mysql,

    /// PostgreSQL
    Postgres,

    /// Generic ANSI SQL
    Generic,
}

impl DialectSetting {
    /// Hint string understood by the parser
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Generic => "generic",
        }
    }
}

/// Default render options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub view_mode: ViewMode,

    #[serde(default)]
    pub direction: LayoutDirection,

    #[serde(default = "default_true")]
    pub show_comments: bool,

    /// Tables always left out of diagrams (migration bookkeeping and the like)
    #[serde(default)]
    pub exclude_tables: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            direction: LayoutDirection::default(),
            show_comments: true,
            exclude_tables: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Build render options from these defaults
    pub fn to_render_options(&self) -> RenderOptions {
        RenderOptions {
            view_mode: self.view_mode,
            direction: self.direction,
            show_comments: self.show_comments,
            exclude_tables: self.exclude_tables.iter().cloned().collect::<BTreeSet<_>>(),
            ..RenderOptions::default()
        }
    }
}

/// Relation inference settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Detect N:M junction tables
    #[serde(default = "default_true")]
    pub identify_junction_tables: bool,

    /// Add implicit foreign keys for columns such as `user_id` -> `users`
    #[serde(default)]
    pub enable_naming_convention: bool,

    /// Suffix marking key columns
    #[serde(default = "default_suffix")]
    pub naming_convention_suffix: String,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            identify_junction_tables: true,
            enable_naming_convention: false,
            naming_convention_suffix: default_suffix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_suffix() -> String {
    "_id".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectSetting,

    /// Render defaults
    #[serde(default)]
    pub render: RenderSettings,

    /// Inference settings
    #[serde(default)]
    pub inference: InferenceSettings,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.dialect, DialectSetting::Auto);
        assert!(config.inference.identify_junction_tables);
        assert!(!config.inference.enable_naming_convention);
        assert_eq!(config.inference.naming_convention_suffix, "_id");
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
            dialect = "postgres"

            [render]
            view_mode = "LOGICAL"
            direction = "LR"
            show_comments = false
            exclude_tables = ["flyway_schema_history"]

            [inference]
            enable_naming_convention = true
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, DialectSetting::Postgres);
        assert_eq!(config.render.view_mode, ViewMode::Logical);
        assert_eq!(config.render.direction, LayoutDirection::Lr);
        assert!(config.inference.enable_naming_convention);
        assert!(config.inference.identify_junction_tables);

        let options = config.render.to_render_options();
        assert!(!options.show_comments);
        assert!(!options.keeps_table("flyway_schema_history"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::from_toml("dialect = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("erdviz.toml");

        let mut config = Config::default();
        config.dialect = DialectSetting::Mysql;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/erdviz.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
