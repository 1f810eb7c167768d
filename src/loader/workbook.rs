//! Reading payroll rows out of Excel workbooks.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use calamine::{Data, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::Timelike;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

use crate::error::{RecapError, RecapResult};
use crate::models::{Record, RecordSet};

use super::columns::{
    CHECK_DATE, COMBINED_TAX, EARNING_AMOUNT, JOB_NAME, LAST_NAME_AND_SUFFIX, PRIMARY_ORG_UNIT,
    REIMBURSEMENT_AMOUNT, REQUIRED_COLUMNS, WITHHOLDING_DEDUCTION_AMT,
    WITHHOLDING_DEDUCTION_NAME,
};

/// Where a workbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookSource {
    /// A workbook on disk.
    Path(PathBuf),
    /// An uploaded workbook held in memory.
    Bytes {
        /// The original file name, used in error messages.
        name: String,
        /// The raw file contents.
        data: Vec<u8>,
    },
}

impl WorkbookSource {
    /// A human-readable name for logs and errors.
    pub fn name(&self) -> String {
        match self {
            WorkbookSource::Path(path) => path.display().to_string(),
            WorkbookSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Loads payroll records from one or more workbooks.
///
/// # Example
///
/// ```no_run
/// use paychex_recap::loader::{RecordLoader, WorkbookSource};
///
/// let loader = RecordLoader::new("Paychex Data");
/// let records = loader.load_all(&[
///     WorkbookSource::Path("exports/january.xlsx".into()),
///     WorkbookSource::Path("exports/february.xlsx".into()),
/// ])?;
/// println!("Loaded {} rows", records.len());
/// # Ok::<(), paychex_recap::error::RecapError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecordLoader {
    sheet_name: String,
}

impl RecordLoader {
    /// Creates a loader reading the named sheet of every workbook.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// Returns the sheet name this loader reads.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Loads every source and concatenates the rows in source order.
    ///
    /// No deduplication happens across sources. Any failing source fails the
    /// whole load.
    pub fn load_all(&self, sources: &[WorkbookSource]) -> RecapResult<RecordSet> {
        if sources.is_empty() {
            return Err(RecapError::NoInputFiles);
        }

        let mut combined = RecordSet::default();
        for source in sources {
            combined.extend(self.load(source)?);
        }

        info!(
            files = sources.len(),
            records = combined.len(),
            "Loaded payroll records"
        );
        Ok(combined)
    }

    /// Loads a single source.
    pub fn load(&self, source: &WorkbookSource) -> RecapResult<RecordSet> {
        match source {
            WorkbookSource::Path(path) => self.load_path(path),
            WorkbookSource::Bytes { name, data } => self.load_bytes(name, data.clone()),
        }
    }

    /// Loads a workbook from disk.
    pub fn load_path(&self, path: &Path) -> RecapResult<RecordSet> {
        let source_name = path.display().to_string();
        let mut workbook = open_workbook_auto(path).map_err(|e| RecapError::WorkbookOpen {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        self.read_sheet(&mut workbook, &source_name)
    }

    /// Loads a workbook from an in-memory upload.
    pub fn load_bytes(&self, name: &str, data: Vec<u8>) -> RecapResult<RecordSet> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(data)).map_err(|e| RecapError::WorkbookOpen {
                source_name: name.to_string(),
                message: e.to_string(),
            })?;
        self.read_sheet(&mut workbook, name)
    }

    fn read_sheet<RS: Read + Seek>(
        &self,
        workbook: &mut Sheets<RS>,
        source_name: &str,
    ) -> RecapResult<RecordSet> {
        if !workbook.sheet_names().iter().any(|s| s == &self.sheet_name) {
            return Err(RecapError::SheetNotFound {
                source_name: source_name.to_string(),
                sheet: self.sheet_name.clone(),
            });
        }

        let range =
            workbook
                .worksheet_range(&self.sheet_name)
                .map_err(|e| RecapError::WorkbookOpen {
                    source_name: source_name.to_string(),
                    message: e.to_string(),
                })?;

        // Spreadsheet row number of the header, 1-based.
        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| RecapError::MissingColumn {
            source_name: source_name.to_string(),
            column: JOB_NAME.to_string(),
        })?;
        let columns = ColumnIndex::from_header(header, source_name)?;

        let mut records = Vec::new();
        for (offset, row) in rows.enumerate() {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }
            let cells = RowCells {
                row,
                columns: &columns,
                source_name,
                row_number: header_row + offset + 1,
            };
            records.push(cells.to_record()?);
        }

        debug!(
            source = source_name,
            sheet = %self.sheet_name,
            records = records.len(),
            "Read payroll sheet"
        );
        Ok(RecordSet::new(records))
    }
}

/// Positions of the required columns in the header row.
struct ColumnIndex {
    positions: Vec<(&'static str, usize)>,
}

impl ColumnIndex {
    fn from_header(header: &[Data], source_name: &str) -> RecapResult<Self> {
        let positions = REQUIRED_COLUMNS
            .iter()
            .map(|&column| {
                header
                    .iter()
                    .position(|cell| cell_text(cell).trim() == column)
                    .map(|index| (column, index))
                    .ok_or_else(|| RecapError::MissingColumn {
                        source_name: source_name.to_string(),
                        column: column.to_string(),
                    })
            })
            .collect::<RecapResult<Vec<_>>>()?;
        Ok(Self { positions })
    }

    fn get(&self, column: &str) -> usize {
        self.positions
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, index)| *index)
            .unwrap_or(usize::MAX)
    }
}

static EMPTY_CELL: Data = Data::Empty;

struct RowCells<'a> {
    row: &'a [Data],
    columns: &'a ColumnIndex,
    source_name: &'a str,
    row_number: usize,
}

impl RowCells<'_> {
    fn cell(&self, column: &str) -> &Data {
        self.row.get(self.columns.get(column)).unwrap_or(&EMPTY_CELL)
    }

    fn text(&self, column: &str) -> String {
        cell_text(self.cell(column)).trim().to_string()
    }

    fn optional_text(&self, column: &str) -> Option<String> {
        match self.cell(column) {
            Data::Empty => None,
            cell => Some(cell_text(cell)),
        }
    }

    fn amount(&self, column: &str) -> RecapResult<Decimal> {
        let cell = self.cell(column);
        let invalid = || RecapError::InvalidAmount {
            source_name: self.source_name.to_string(),
            row: self.row_number,
            column: column.to_string(),
            value: cell_text(cell),
        };

        match cell {
            Data::Empty => Ok(Decimal::ZERO),
            Data::Int(i) => Ok(Decimal::from(*i)),
            Data::Float(f) => Decimal::from_f64(*f).ok_or_else(invalid),
            Data::String(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
            Data::String(s) => Decimal::from_str(s.trim()).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    fn to_record(&self) -> RecapResult<Record> {
        Ok(Record {
            job_name: self.text(JOB_NAME),
            primary_org_unit: self.text(PRIMARY_ORG_UNIT),
            check_date: self.text(CHECK_DATE),
            last_name_and_suffix: self.text(LAST_NAME_AND_SUFFIX),
            withholding_deduction_name: self.optional_text(WITHHOLDING_DEDUCTION_NAME),
            withholding_deduction_amt: self.amount(WITHHOLDING_DEDUCTION_AMT)?,
            earning_amount: self.amount(EARNING_AMOUNT)?,
            reimbursement_other_payment_amount: self.amount(REIMBURSEMENT_AMOUNT)?,
            combined_company_and_employee_tax_amount: self.amount(COMBINED_TAX)?,
            child_support_401k: Decimal::ZERO,
            other_ded: Decimal::ZERO,
        })
    }
}

/// Renders a cell as text. Excel dates become `YYYY-MM-DD`, or
/// `YYYY-MM-DD HH:MM:SS` when they carry a time of day.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
