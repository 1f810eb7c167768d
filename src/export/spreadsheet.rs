//! QuickBooks recap workbook export.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::debug;

use crate::config::ExporterKind;
use crate::error::{RecapError, RecapResult};
use crate::models::DateRecap;

use super::{ExportArtifact, Exporter, file_safe};

/// MIME type of `.xlsx` files.
pub const SPREADSHEET_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Sheet1";
const HEADERS: [&str; 3] = ["Job Name", "Salary", "Tax"];
const MONEY_FORMAT: &str = "#,##0.00";

/// Writes the recap table as `QB Recap {check_date}.xlsx`.
///
/// The sheet has a `Job Name | Salary | Tax` header, one row per job name,
/// and the bold `Total` row last. Amounts are written as numbers; the money
/// format only affects display.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExporter;

impl SpreadsheetExporter {
    /// Creates the exporter.
    pub fn new() -> Self {
        Self
    }

    fn render(&self, recap: &DateRecap) -> Result<Vec<u8>, XlsxError> {
        let header_format = Format::new().set_bold();
        let money_format = Format::new().set_num_format(MONEY_FORMAT);
        let total_label_format = Format::new().set_bold();
        let total_money_format = Format::new().set_bold().set_num_format(MONEY_FORMAT);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        worksheet.set_column_width(0, 28)?;
        worksheet.set_column_width(1, 16)?;
        worksheet.set_column_width(2, 16)?;

        for (col, title) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        let mut row: u32 = 1;
        for category in recap.table.rows() {
            worksheet.write_string(row, 0, &category.job_name)?;
            worksheet.write_number_with_format(row, 1, to_number(category.salary), &money_format)?;
            worksheet.write_number_with_format(row, 2, to_number(category.tax), &money_format)?;
            row += 1;
        }

        let total = recap.table.total();
        worksheet.write_string_with_format(row, 0, &total.job_name, &total_label_format)?;
        worksheet.write_number_with_format(row, 1, to_number(total.salary), &total_money_format)?;
        worksheet.write_number_with_format(row, 2, to_number(total.tax), &total_money_format)?;

        workbook.save_to_buffer()
    }
}

/// Excel stores numbers as doubles.
fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

impl Exporter for SpreadsheetExporter {
    fn kind(&self) -> ExporterKind {
        ExporterKind::Spreadsheet
    }

    fn file_name(&self, check_date: &str) -> String {
        format!("QB Recap {}.xlsx", file_safe(check_date))
    }

    fn export(&self, recap: &DateRecap) -> RecapResult<ExportArtifact> {
        let file_name = self.file_name(&recap.check_date);
        let bytes = self.render(recap).map_err(|e| RecapError::ExportError {
            file_name: file_name.clone(),
            message: e.to_string(),
        })?;

        debug!(
            check_date = %recap.check_date,
            file_name = %file_name,
            bytes = bytes.len(),
            "Rendered recap workbook"
        );

        Ok(ExportArtifact {
            file_name,
            mime_type: SPREADSHEET_MIME_TYPE.to_string(),
            bytes,
        })
    }
}
