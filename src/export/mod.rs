//! Recap exporters.
//!
//! An [`Exporter`] turns one [`DateRecap`] into a downloadable file. The
//! configured exporters run for every check date; see
//! [`ExportConfig::exporters`](crate::config::ExportConfig).

mod pdf;
mod spreadsheet;

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ExportConfig, ExporterKind};
use crate::error::{RecapError, RecapResult};
use crate::models::DateRecap;

pub use pdf::{PDF_MIME_TYPE, PdfExporter};
pub use spreadsheet::{SPREADSHEET_MIME_TYPE, SpreadsheetExporter};

/// Renders a recap into a file.
pub trait Exporter: Send + Sync {
    /// The format this exporter produces.
    fn kind(&self) -> ExporterKind;

    /// The download file name for a check date.
    fn file_name(&self, check_date: &str) -> String;

    /// Renders the recap.
    fn export(&self, recap: &DateRecap) -> RecapResult<ExportArtifact>;
}

/// A rendered export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    /// The download file name.
    pub file_name: String,
    /// The MIME type of `bytes`.
    pub mime_type: String,
    /// The file contents.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Returns the artifact as a base64 `data:` URI.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Returns an HTML anchor that downloads the artifact.
    ///
    /// The file name is HTML escaped, since it carries check-date text from
    /// the upload.
    ///
    /// # Example
    ///
    /// ```
    /// use paychex_recap::export::ExportArtifact;
    ///
    /// let artifact = ExportArtifact {
    ///     file_name: "QB Recap 2024-01-01.xlsx".to_string(),
    ///     mime_type: "text/plain".to_string(),
    ///     bytes: b"hi".to_vec(),
    /// };
    /// assert_eq!(
    ///     artifact.download_link(),
    ///     "<a href=\"data:text/plain;base64,aGk=\" download=\"QB Recap 2024-01-01.xlsx\">Download QB Recap 2024-01-01.xlsx File</a>"
    /// );
    /// ```
    pub fn download_link(&self) -> String {
        let file_name = escape_html(&self.file_name);
        format!(
            "<a href=\"{}\" download=\"{}\">Download {} File</a>",
            self.data_uri(),
            file_name,
            file_name
        )
    }

    /// Writes the artifact into `dir`, creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> RecapResult<PathBuf> {
        let export_error = |e: std::io::Error| RecapError::ExportError {
            file_name: self.file_name.clone(),
            message: e.to_string(),
        };

        fs::create_dir_all(dir).map_err(export_error)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(export_error)?;

        info!(path = %path.display(), bytes = self.bytes.len(), "Wrote export file");
        Ok(path)
    }
}

/// Builds the exporters named in the configuration, in order.
pub fn exporters_for(config: &ExportConfig) -> Vec<Box<dyn Exporter>> {
    config
        .exporters
        .iter()
        .map(|kind| -> Box<dyn Exporter> {
            match kind {
                ExporterKind::Spreadsheet => Box::new(SpreadsheetExporter::new()),
                ExporterKind::Pdf => Box::new(PdfExporter::new()),
            }
        })
        .collect()
}

/// Runs every exporter over one recap.
///
/// When `output_dir` is set each artifact is also written to disk as soon as
/// it is rendered.
pub fn export_recap(
    recap: &DateRecap,
    exporters: &[Box<dyn Exporter>],
    output_dir: Option<&Path>,
) -> RecapResult<Vec<ExportArtifact>> {
    exporters
        .iter()
        .map(|exporter| {
            let artifact = exporter.export(recap)?;
            if let Some(dir) = output_dir {
                artifact.write_to(dir)?;
            }
            Ok(artifact)
        })
        .collect()
}

/// Makes a check date safe to embed in a file name.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn file_safe(check_date: &str) -> String {
    check_date
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect()
}
