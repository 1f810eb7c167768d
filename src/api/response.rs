//! Response types for the recap API.
//!
//! This module defines the success bodies of both endpoints and the error
//! response structures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::RecapError;
use crate::export::ExportArtifact;
use crate::models::{AggregateRow, AuditTrace, DateRecap};

/// A downloadable export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportLink {
    /// The download file name.
    pub file_name: String,
    /// The MIME type of the file.
    pub mime_type: String,
    /// An HTML anchor embedding the file as a data URI.
    pub download_link: String,
}

impl From<&ExportArtifact> for ExportLink {
    fn from(artifact: &ExportArtifact) -> Self {
        Self {
            file_name: artifact.file_name.clone(),
            mime_type: artifact.mime_type.clone(),
            download_link: artifact.download_link(),
        }
    }
}

/// The recap for one check date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRecapResponse {
    /// The check date.
    pub check_date: String,
    /// One row per job name, sorted by job name.
    pub rows: Vec<AggregateRow>,
    /// The total row.
    pub total: AggregateRow,
    /// The rendered exports.
    pub exports: Vec<ExportLink>,
}

impl DateRecapResponse {
    /// Builds the response entry for a recap and its artifacts.
    pub fn new(recap: &DateRecap, artifacts: &[ExportArtifact]) -> Self {
        Self {
            check_date: recap.check_date.clone(),
            rows: recap.table.rows().to_vec(),
            total: recap.table.total().clone(),
            exports: artifacts.iter().map(ExportLink::from).collect(),
        }
    }
}

/// Response body for the `/recap` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapResponse {
    /// Correlation id of the request, also present in the logs.
    pub report_id: String,
    /// One entry per check date, in first-appearance order.
    pub recaps: Vec<DateRecapResponse>,
    /// Every audit step of the run.
    pub audit_trace: AuditTrace,
}

/// JSON error body shared by both endpoints.
///
/// `code` is stable for clients; `message` is the rendered [`RecapError`]
/// or a description of the rejected request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable code, e.g. `SCHEMA_ERROR`.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// Hint on how to fix the input, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Builds an error without details.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches a hint to the error.
    pub fn detail(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// A request body that deserialized but is missing required data.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// A request body that is not the expected JSON.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// An [`ApiError`] paired with the status it is sent with.
pub struct ApiErrorResponse {
    /// 400 for caller mistakes, 500 otherwise.
    pub status: StatusCode,
    /// The JSON body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RecapError> for ApiErrorResponse {
    fn from(error: RecapError) -> Self {
        let status = if error.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = error.to_string();

        let error = match error {
            RecapError::ConfigNotFound { .. } | RecapError::ConfigParseError { .. } => {
                ApiError::new("CONFIG_ERROR", "Configuration error").detail(message)
            }
            RecapError::NoInputFiles => ApiError::validation_error(message),
            RecapError::InvalidUpload { .. } => ApiError::new("INVALID_UPLOAD", message)
                .detail("File content must be base64 encoded"),
            RecapError::WorkbookOpen { .. } => ApiError::new("INVALID_WORKBOOK", message)
                .detail("The file could not be read as an Excel workbook"),
            RecapError::SheetNotFound { .. } | RecapError::MissingColumn { .. } => {
                ApiError::new("SCHEMA_ERROR", message)
                    .detail("The workbook does not match the Paychex export layout")
            }
            RecapError::InvalidAmount { .. } => {
                ApiError::new("TYPE_ERROR", message).detail("Amount columns must hold numbers")
            }
            RecapError::CalculationError { .. } => {
                ApiError::new("CALCULATION_ERROR", "Calculation failed").detail(message)
            }
            RecapError::ExportError { .. } => {
                ApiError::new("EXPORT_ERROR", "Export failed").detail(message)
            }
        };

        ApiErrorResponse { status, error }
    }
}
