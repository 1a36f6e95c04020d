//! Engine configuration
//!
//! Sources in precedence order, later wins:
//!
//! 1. built-in defaults
//! 2. an optional file (`.toml`, `.yaml`/`.yml` or `.json`)
//! 3. `TRACKER_*` environment variables, e.g. `TRACKER_MAX_INHERITANCE_DEPTH=8`

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracker_common::Pretty;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TRACKER_";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError { source: figment::Error },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

/// Settings for [`crate::SchemaEngine`] and the store it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Longest allowed base type chain, not counting the type itself.
    pub max_inheritance_depth: usize,
    /// Keep resolved schemas in memory between calls.
    pub cache_resolved: bool,
    /// Fill absent optional enum and list fields with their type default.
    pub fill_defaults: bool,
    /// Directory of the YAML store, if one is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_root: Option<PathBuf>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_inheritance_depth: 32,
            cache_resolved: true,
            fill_defaults: true,
            store_root: None,
        }
    }
}

impl SchemaConfig {
    /// Load from defaults, `file` if given, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: SchemaConfig = Self::figment(file)?.extract()?;
        config.validate()?;
        debug!("loaded schema configuration: {}", Pretty(&config));
        Ok(config)
    }

    /// The layered figment behind [`SchemaConfig::load`].
    pub fn figment(file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(SchemaConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(file_provider(path)?);
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into())))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_inheritance_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_inheritance_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn file_provider(path: &Path) -> Result<Figment, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match extension.as_str() {
        "toml" => Ok(Figment::from(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
        "json" => Ok(Figment::from(Json::file(path))),
        other => Err(ConfigError::UnsupportedFormat {
            format: other.to_string(),
        }),
    }
}
