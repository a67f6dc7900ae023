//! Configuration types for rustcop.
//!
//! A configuration file maps rule identifiers to per-rule settings:
//!
//! ```toml
//! [line-length]
//! enabled = true
//! max = 120
//!
//! [tab-indentation]
//! enabled = false
//! ```
//!
//! Rule identifiers that no registered rule uses are ignored, whatever
//! their entry holds. A malformed entry only becomes an error once
//! [`Config::validate`] is asked about a registered rule.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Immutable mapping from rule identifier to rule settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    rules: HashMap<String, RuleConfig>,
    /// Entries that did not deserialize, with the reason.
    rejected: HashMap<String, String>,
    /// File the configuration was loaded from.
    path: Option<PathBuf>,
}

impl Config {
    /// Creates an empty configuration (every rule enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Entries whose value is not a valid rule table are set aside rather
    /// than failing the parse; see [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for (name, value) in table {
            match value.try_into::<RuleConfig>() {
                Ok(rule) => {
                    config.rules.insert(name, rule);
                }
                Err(e) => {
                    config.rejected.insert(name, e.to_string().trim_end().to_string());
                }
            }
        }
        Ok(config)
    }

    /// Checks that every entry for one of `rule_names` is well formed.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the first malformed entry.
    pub fn validate<'a>(
        &self,
        rule_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        for name in rule_names {
            if let Some(message) = self.rejected.get(name) {
                return Err(ConfigError::Parse {
                    path: self.path.clone().unwrap_or_default(),
                    message: format!("invalid settings for rule `{name}`: {message}"),
                });
            }
        }
        Ok(())
    }

    /// Gets the settings for a rule, if the configuration mentions it.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Checks if a rule is enabled.
    ///
    /// A rule is enabled unless its entry explicitly sets `enabled = false`.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Number of rule entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the configuration has no rule entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default, alias = "Enabled")]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default, alias = "Severity")]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors. Both variants are fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed config file content.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path of the malformed file (empty when parsed from a string).
        path: PathBuf,
        /// Parse error message.
        message: String,
    },
}

impl ConfigError {
    /// Path of the configuration file involved.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}
