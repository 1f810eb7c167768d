//! Workbook ingestion for the recap engine.
//!
//! Reads the payroll sheet of one or more Paychex export workbooks and
//! concatenates the rows into a single [`RecordSet`](crate::models::RecordSet).

pub mod columns;
mod workbook;

pub use workbook::{RecordLoader, WorkbookSource};
