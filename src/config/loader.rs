//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading recap
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{RecapError, RecapResult};

use super::types::{ExportConfig, RecapConfig, RecapRules, ServerConfig};

/// Loads and provides access to recap configuration.
///
/// # Directory Structure
///
/// ```text
/// config/paychex/
/// ├── rules.yaml   # Classification and deduction keyword rules (required)
/// ├── export.yaml  # Sheet name, exporters, output directory (required)
/// └── server.yaml  # HTTP bind address and body limit (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use paychex_recap::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/paychex")?;
/// println!("Sentinel: {}", loader.rules().classification.sentinel);
/// # Ok::<(), paychex_recap::error::RecapError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: RecapConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `rules.yaml` or `export.yaml` is missing, or if
    /// any present file contains invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> RecapResult<Self> {
        let path = path.as_ref();

        let rules = Self::load_yaml::<RecapRules>(&path.join("rules.yaml"))?;
        let export = Self::load_yaml::<ExportConfig>(&path.join("export.yaml"))?;

        let server_path = path.join("server.yaml");
        let server = if server_path.exists() {
            Self::load_yaml::<ServerConfig>(&server_path)?
        } else {
            ServerConfig::default()
        };

        debug!(
            config_dir = %path.display(),
            exporters = ?export.exporters,
            "Loaded recap configuration"
        );

        Ok(Self {
            config: RecapConfig::new(rules, export, server),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: RecapConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> RecapResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| RecapError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| RecapError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RecapConfig {
        &self.config
    }

    /// Returns the classification and deduction rules.
    pub fn rules(&self) -> &RecapRules {
        self.config.rules()
    }

    /// Returns the export settings.
    pub fn export(&self) -> &ExportConfig {
        self.config.export()
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        self.config.server()
    }
}
