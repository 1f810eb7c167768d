//! Recap models for the aggregation output.
//!
//! This module contains [`AggregateRow`], the [`RecapTable`] built for one
//! check date, and [`DateRecap`], which bundles the table with the records
//! and audit steps that produced it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditStep, RecordSet};
use crate::error::{RecapError, RecapResult};

/// Label of the synthetic grand-total row.
pub const TOTAL_LABEL: &str = "Total";

/// One category's summary for a check date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// The job category, or [`TOTAL_LABEL`] for the total row.
    pub job_name: String,
    /// Earnings plus reimbursements minus other deductions.
    pub salary: Decimal,
    /// Combined tax minus withholding plus reclassified deductions.
    pub tax: Decimal,
}

/// The aggregate table for one check date.
///
/// The total row is derived from the category rows when the table is
/// built and cannot be set independently.
///
/// # Example
///
/// ```
/// use paychex_recap::models::{AggregateRow, RecapTable};
/// use rust_decimal::Decimal;
///
/// let table = RecapTable::from_rows(vec![
///     AggregateRow { job_name: "Misc".to_string(), salary: Decimal::new(1000, 0), tax: Decimal::ZERO },
///     AggregateRow { job_name: "Sales".to_string(), salary: Decimal::new(2000, 0), tax: Decimal::new(300, 0) },
/// ])?;
/// assert_eq!(table.total().salary, Decimal::new(3000, 0));
/// assert_eq!(table.total().tax, Decimal::new(300, 0));
/// # Ok::<(), paychex_recap::error::RecapError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapTable {
    rows: Vec<AggregateRow>,
    total: AggregateRow,
}

impl RecapTable {
    /// Builds a table from category rows, computing the total row.
    ///
    /// Returns `CalculationError` if a total overflows.
    pub fn from_rows(rows: Vec<AggregateRow>) -> RecapResult<Self> {
        let mut salary = Decimal::ZERO;
        let mut tax = Decimal::ZERO;
        for row in &rows {
            salary = checked_sum(salary, row.salary, "Total salary")?;
            tax = checked_sum(tax, row.tax, "Total tax")?;
        }

        Ok(Self {
            rows,
            total: AggregateRow {
                job_name: TOTAL_LABEL.to_string(),
                salary,
                tax,
            },
        })
    }

    /// Returns the category rows, without the total row.
    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    /// Returns the total row.
    pub fn total(&self) -> &AggregateRow {
        &self.total
    }

    /// Iterates the category rows followed by the total row.
    pub fn all_rows(&self) -> impl Iterator<Item = &AggregateRow> {
        self.rows.iter().chain(std::iter::once(&self.total))
    }

    /// Looks up a category row by job name.
    pub fn row(&self, job_name: &str) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.job_name == job_name)
    }
}

fn checked_sum(acc: Decimal, value: Decimal, what: &str) -> RecapResult<Decimal> {
    acc.checked_add(value)
        .ok_or_else(|| RecapError::CalculationError {
            message: format!("{} overflowed", what),
        })
}

/// Everything produced for one check date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRecap {
    /// The check date this recap covers.
    pub check_date: String,
    /// The date's records after deduction reclassification.
    pub records: RecordSet,
    /// The aggregate table.
    pub table: RecapTable,
    /// Audit steps recorded while building this recap.
    pub audit_steps: Vec<AuditStep>,
}

impl DateRecap {
    /// Sum of withholding deductions across the date's records.
    pub fn total_deductions(&self) -> Decimal {
        self.records
            .iter()
            .map(|r| r.withholding_deduction_amt)
            .sum()
    }

    /// Distinct job names in the date's records, in record order.
    pub fn projects(&self) -> Vec<&str> {
        self.records.distinct(|r| r.job_name.as_str())
    }

    /// Distinct employee surnames in the date's records, in record order.
    pub fn employees(&self) -> Vec<&str> {
        self.records.distinct(|r| r.last_name_and_suffix.as_str())
    }
}
