//! Configuration loading and management for the recap engine.
//!
//! This module loads the classification rules, deduction keyword lists and
//! export settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use paychex_recap::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/paychex").unwrap();
//! println!("Exporters: {:?}", config.export().exporters);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ClassificationRules, DeductionRules, ExportConfig, ExporterKind, RecapConfig, RecapRules,
    ServerConfig,
};
