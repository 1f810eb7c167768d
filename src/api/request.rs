//! Request types for the recap API.
//!
//! Workbooks travel inside the JSON body as base64 strings so that both
//! endpoints accept plain `application/json`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{RecapError, RecapResult};
use crate::loader::WorkbookSource;
use crate::pipeline::FilterSelection;

/// One uploaded workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// The original file name, e.g. `january.xlsx`.
    pub name: String,
    /// The file contents, base64 encoded.
    pub content_base64: String,
}

impl UploadedFile {
    /// Encodes raw workbook bytes for upload.
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Self {
        Self {
            name: name.into(),
            content_base64: STANDARD.encode(data),
        }
    }

    /// Decodes the upload into a workbook source.
    pub fn decode(&self) -> RecapResult<WorkbookSource> {
        let data = STANDARD
            .decode(self.content_base64.trim())
            .map_err(|e| RecapError::InvalidUpload {
                name: self.name.clone(),
                message: e.to_string(),
            })?;

        Ok(WorkbookSource::Bytes {
            name: self.name.clone(),
            data,
        })
    }
}

/// Decodes every upload, failing on the first bad one.
pub(crate) fn decode_files(files: &[UploadedFile]) -> RecapResult<Vec<WorkbookSource>> {
    files.iter().map(UploadedFile::decode).collect()
}

/// Request body for the `/options` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsRequest {
    /// The workbooks to read.
    pub files: Vec<UploadedFile>,
}

/// Request body for the `/recap` endpoint.
///
/// Omitted filter columns default to `["ALL"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapRequest {
    /// The workbooks to read. Their records are concatenated in order.
    pub files: Vec<UploadedFile>,
    /// The filter selection.
    #[serde(default)]
    pub filters: FilterSelection,
}
