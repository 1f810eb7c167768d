//! Configuration types for recap generation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every structure has a
//! `Default` carrying the built-in Paychex rules, so missing keys fall back
//! to them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rules for replacing the sentinel job name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// The placeholder job name that must be replaced.
    pub sentinel: String,
    /// The org unit whose unassigned rows become `maintenance_job_name`.
    pub maintenance_org_unit: String,
    /// Job name for unassigned rows in the maintenance org unit.
    pub maintenance_job_name: String,
    /// Job name for every other unassigned row.
    pub default_job_name: String,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            sentinel: "Unassigned".to_string(),
            maintenance_org_unit: "3 Maintenance".to_string(),
            maintenance_job_name: "Misc".to_string(),
            default_job_name: "Office".to_string(),
        }
    }
}

/// Keyword lists for deduction reclassification.
///
/// Keywords are evaluated in list order; trailing spaces are significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionRules {
    /// Keywords whose deduction amounts move into "Child Support/401k".
    pub child_support_401k_keywords: Vec<String>,
    /// Keywords whose deduction amounts move into "Other Ded".
    pub other_deduction_keywords: Vec<String>,
}

impl Default for DeductionRules {
    fn default() -> Self {
        Self {
            child_support_401k_keywords: vec!["PX401 ".to_string(), "Child ".to_string()],
            other_deduction_keywords: vec!["Union".to_string(), "misc".to_string()],
        }
    }
}

/// Contents of `rules.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapRules {
    /// Sentinel job-name replacement rules.
    pub classification: ClassificationRules,
    /// Deduction keyword rules.
    pub deductions: DeductionRules,
}

/// The export formats a recap can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterKind {
    /// `QB Recap {check_date}.xlsx`.
    Spreadsheet,
    /// `paychex_report_{check_date}.pdf`.
    Pdf,
}

/// Contents of `export.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Name of the sheet holding payroll rows in every input workbook.
    pub sheet_name: String,
    /// Exporters to run for every check date, in order.
    pub exporters: Vec<ExporterKind>,
    /// When set, artifacts are also written into this directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Paychex Data".to_string(),
            exporters: vec![ExporterKind::Spreadsheet],
            output_dir: None,
        }
    }
}

/// Contents of `server.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API binds to.
    pub bind_address: String,
    /// Largest request body accepted, in bytes. Workbooks travel base64
    /// encoded, so this is about 4/3 of the largest upload.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// The complete recap configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecapConfig {
    rules: RecapRules,
    export: ExportConfig,
    server: ServerConfig,
}

impl RecapConfig {
    /// Creates a configuration from its parts.
    pub fn new(rules: RecapRules, export: ExportConfig, server: ServerConfig) -> Self {
        Self {
            rules,
            export,
            server,
        }
    }

    /// Returns the classification and deduction rules.
    pub fn rules(&self) -> &RecapRules {
        &self.rules
    }

    /// Returns the export settings.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }
}
