//! Configuration for import runs.
//!
//! A YAML file names the schema, the tokenizer settings, one settings entry
//! per mapped field, the storage root and logging. `${VAR}` and
//! `${VAR:-default}` references are replaced from the environment before
//! parsing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use market_import::config::load_config;
//!
//! let config = load_config(Some("ticks.yaml"))?;
//! let mut fields = config.field_set()?;
//! let settings = config.importer_settings()?;
//! ```

mod import;
mod observability;
mod storage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use import::ImportConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use storage::StorageConfig;

use crate::application::importer::ImporterSettings;
use crate::application::parser::{LineSeparator, ParserSettings, parse_column_separator};
use crate::domain::mapping::{FieldSet, FieldSettings};
use crate::error::ConfigurationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigurationError> for ConfigError {
    fn from(error: ConfigurationError) -> Self {
        Self::ValidationError(error.to_string())
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema and tokenizer settings.
    pub import: ImportConfig,
    /// Field settings, applied in order.
    #[serde(default)]
    pub fields: Vec<FieldSettings>,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Tokenizer and row settings.
    pub fn parser_settings(&self) -> Result<ParserSettings, ConfigurationError> {
        Ok(ParserSettings {
            column_separator: parse_column_separator(&self.import.column_separator)?,
            line_separator: self.import.line_separator.parse::<LineSeparator>()?,
            skip_lines: self.import.skip_lines,
            time_zone: self.import.time_zone,
            ignore_non_id_securities: self.import.ignore_non_id_securities,
        })
    }

    /// Importer settings, including the parser's.
    pub fn importer_settings(&self) -> Result<ImporterSettings, ConfigurationError> {
        if self.import.flush_threshold == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "flush_threshold".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(ImporterSettings {
            parser: self.parser_settings()?,
            update_duplicate_securities: self.import.update_duplicate_securities,
            flush_threshold: self.import.flush_threshold,
        })
    }

    /// The schema's field set with every field setting applied.
    pub fn field_set(&self) -> Result<FieldSet, ConfigurationError> {
        let mut fields = FieldSet::for_tag(&self.import.schema)?;
        fields.configure(&self.fields)?;
        Ok(fields)
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// Everything that would fail before the first row fails here instead.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.importer_settings()?;
    config.field_set()?;

    if config.storage.root.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.root must not be empty".to_string(),
        ));
    }

    Ok(())
}
