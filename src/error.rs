//! Error types for the recap engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that can end a recap run: configuration, ingestion,
//! calculation and export.

use thiserror::Error;

/// The main error type for the recap engine.
///
/// Every failure is terminal for the invocation that hit it. There are no
/// retries and no partial results for the failing stage.
///
/// # Example
///
/// ```
/// use paychex_recap::error::RecapError;
///
/// let error = RecapError::SheetNotFound {
///     source_name: "march.xlsx".to_string(),
///     sheet: "Paychex Data".to_string(),
/// };
/// assert_eq!(error.to_string(), "Sheet 'Paychex Data' not found in march.xlsx");
/// ```
#[derive(Debug, Error)]
pub enum RecapError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A recap was requested without any input workbook.
    #[error("No input files were provided")]
    NoInputFiles,

    /// An uploaded file could not be decoded.
    #[error("Invalid upload '{name}': {message}")]
    InvalidUpload {
        /// The uploaded file name.
        name: String,
        /// A description of the decoding failure.
        message: String,
    },

    /// A workbook could not be opened or read.
    #[error("Failed to open workbook {source_name}: {message}")]
    WorkbookOpen {
        /// The file name or path of the workbook.
        source_name: String,
        /// The reader's error message.
        message: String,
    },

    /// The payroll sheet is missing from a workbook.
    #[error("Sheet '{sheet}' not found in {source_name}")]
    SheetNotFound {
        /// The file name or path of the workbook.
        source_name: String,
        /// The expected sheet name.
        sheet: String,
    },

    /// A required column is missing from the payroll sheet header.
    #[error("Column '{column}' missing from {source_name}")]
    MissingColumn {
        /// The file name or path of the workbook.
        source_name: String,
        /// The missing column header.
        column: String,
    },

    /// An amount cell holds a value that is not a number.
    #[error("Invalid amount in {source_name} row {row}, column '{column}': {value}")]
    InvalidAmount {
        /// The file name or path of the workbook.
        source_name: String,
        /// The 1-based spreadsheet row.
        row: usize,
        /// The column header.
        column: String,
        /// The offending cell text.
        value: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// An exporter failed to render or write an artifact.
    #[error("Failed to export '{file_name}': {message}")]
    ExportError {
        /// The artifact file name.
        file_name: String,
        /// A description of the export failure.
        message: String,
    },
}

impl RecapError {
    /// Returns true for errors caused by the caller's input rather than the
    /// engine or its configuration.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RecapError::NoInputFiles
                | RecapError::InvalidUpload { .. }
                | RecapError::WorkbookOpen { .. }
                | RecapError::SheetNotFound { .. }
                | RecapError::MissingColumn { .. }
                | RecapError::InvalidAmount { .. }
        )
    }
}

/// A type alias for Results that return RecapError.
pub type RecapResult<T> = Result<T, RecapError>;
