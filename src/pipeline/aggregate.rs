//! Per-category aggregation.
//!
//! Groups one check date's records by job name and derives the `Salary` and
//! `Tax` figures posted to the books:
//!
//! ```text
//! Salary = Σ earning + Σ reimbursement − Σ other_ded
//! Tax    = Σ combined_tax − Σ withholding + Σ other_ded + Σ child_support_401k
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{RecapError, RecapResult};
use crate::models::{AggregateRow, AuditStep, Record, RecapTable, RecordSet};

/// The result of aggregating a record set, including the audit step.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// The aggregate table with its total row.
    pub table: RecapTable,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Raw column sums for one job name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GroupSums {
    earning: Decimal,
    reimbursement: Decimal,
    withholding: Decimal,
    child_support_401k: Decimal,
    combined_tax: Decimal,
    other_ded: Decimal,
}

impl GroupSums {
    fn add(&mut self, record: &Record) -> RecapResult<()> {
        self.earning = add(self.earning, record.earning_amount)?;
        self.reimbursement = add(self.reimbursement, record.reimbursement_other_payment_amount)?;
        self.withholding = add(self.withholding, record.withholding_deduction_amt)?;
        self.child_support_401k = add(self.child_support_401k, record.child_support_401k)?;
        self.combined_tax = add(
            self.combined_tax,
            record.combined_company_and_employee_tax_amount,
        )?;
        self.other_ded = add(self.other_ded, record.other_ded)?;
        Ok(())
    }

    fn salary(&self) -> RecapResult<Decimal> {
        let gross = add(self.earning, self.reimbursement)?;
        sub(gross, self.other_ded)
    }

    fn tax(&self) -> RecapResult<Decimal> {
        let net = sub(self.combined_tax, self.withholding)?;
        let with_other = add(net, self.other_ded)?;
        add(with_other, self.child_support_401k)
    }
}

fn add(a: Decimal, b: Decimal) -> RecapResult<Decimal> {
    a.checked_add(b).ok_or_else(overflow)
}

fn sub(a: Decimal, b: Decimal) -> RecapResult<Decimal> {
    a.checked_sub(b).ok_or_else(overflow)
}

fn overflow() -> RecapError {
    RecapError::CalculationError {
        message: "decimal overflow while aggregating amounts".to_string(),
    }
}

/// Aggregates records into one row per job name plus a total row.
///
/// Rows are ordered by job name ascending; the total row is the sum of the
/// category rows. No rounding is applied. An empty input yields a table with
/// only a zero total row.
///
/// Records with a blank job name belong to no category and are left out of
/// every row, the total included.
///
/// # Errors
///
/// Returns `CalculationError` if any sum overflows.
///
/// # Examples
///
/// ```
/// use paychex_recap::models::{Record, RecordSet};
/// use paychex_recap::pipeline::aggregate_records;
/// use rust_decimal::Decimal;
///
/// let records = RecordSet::new(vec![
///     Record {
///         job_name: "Misc".to_string(),
///         earning_amount: Decimal::new(1000, 0),
///         ..Default::default()
///     },
///     Record {
///         job_name: "Sales".to_string(),
///         earning_amount: Decimal::new(2000, 0),
///         combined_company_and_employee_tax_amount: Decimal::new(300, 0),
///         ..Default::default()
///     },
/// ]);
///
/// let result = aggregate_records(&records, None, 1)?;
/// assert_eq!(result.table.total().salary, Decimal::new(3000, 0));
/// assert_eq!(result.table.total().tax, Decimal::new(300, 0));
/// # Ok::<(), paychex_recap::error::RecapError>(())
/// ```
pub fn aggregate_records(
    records: &RecordSet,
    check_date: Option<&str>,
    step_number: u32,
) -> RecapResult<AggregationResult> {
    let mut groups: BTreeMap<&str, GroupSums> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in records {
        if record.job_name.trim().is_empty() {
            skipped += 1;
            continue;
        }
        groups
            .entry(record.job_name.as_str())
            .or_default()
            .add(record)?;
    }

    let rows = groups
        .iter()
        .map(|(job_name, sums)| {
            Ok(AggregateRow {
                job_name: job_name.to_string(),
                salary: sums.salary()?,
                tax: sums.tax()?,
            })
        })
        .collect::<RecapResult<Vec<_>>>()?;

    let table = RecapTable::from_rows(rows)?;

    debug!(
        check_date = check_date.unwrap_or(""),
        records = records.len(),
        skipped_blank_job_name = skipped,
        categories = table.rows().len(),
        total_salary = %table.total().salary,
        total_tax = %table.total().tax,
        "Aggregated records by job name"
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "job_name_aggregation".to_string(),
        rule_name: "Salary and Tax by Job Name".to_string(),
        check_date: check_date.map(str::to_string),
        input: serde_json::json!({
            "records": records.len(),
            "skipped_blank_job_name": skipped,
            "categories": table.rows().iter().map(|r| r.job_name.as_str()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "total_salary": table.total().salary.normalize().to_string(),
            "total_tax": table.total().tax.normalize().to_string()
        }),
        reasoning: format!(
            "{} records grouped into {} categories ({} without a job name skipped); total salary ${}, total tax ${}",
            records.len(),
            table.rows().len(),
            skipped,
            table.total().salary.normalize(),
            table.total().tax.normalize()
        ),
    };

    Ok(AggregationResult { table, audit_step })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(job_name: &str) -> Record {
        Record {
            job_name: job_name.to_string(),
            check_date: "2024-01-01".to_string(),
            ..Default::default()
        }
    }

    fn aggregate(records: Vec<Record>) -> RecapTable {
        aggregate_records(&RecordSet::new(records), Some("2024-01-01"), 1)
            .unwrap()
            .table
    }

    #[test]
    fn test_salary_formula() {
        let mut r = record("Sales");
        r.earning_amount = dec("1500.00");
        r.reimbursement_other_payment_amount = dec("75.50");
        r.other_ded = dec("20.00");

        let table = aggregate(vec![r]);
        assert_eq!(table.row("Sales").unwrap().salary, dec("1555.50"));
    }

    #[test]
    fn test_tax_formula() {
        let mut r = record("Sales");
        r.combined_company_and_employee_tax_amount = dec("400.00");
        r.withholding_deduction_amt = dec("60.00");
        r.other_ded = dec("20.00");
        r.child_support_401k = dec("15.00");

        let table = aggregate(vec![r]);
        // 400 - 60 + 20 + 15
        assert_eq!(table.row("Sales").unwrap().tax, dec("375.00"));
    }

    #[test]
    fn test_zero_derived_columns_reduce_to_simple_sums() {
        let mut a = record("Office");
        a.earning_amount = dec("800");
        a.reimbursement_other_payment_amount = dec("25");
        a.combined_company_and_employee_tax_amount = dec("120");
        a.withholding_deduction_amt = dec("30");
        let mut b = record("Office");
        b.earning_amount = dec("200");
        b.combined_company_and_employee_tax_amount = dec("40");
        b.withholding_deduction_amt = dec("5");

        let table = aggregate(vec![a, b]);
        let office = table.row("Office").unwrap();
        assert_eq!(office.salary, dec("1025"));
        assert_eq!(office.tax, dec("125"));
    }

    #[test]
    fn test_rows_sorted_by_job_name_with_total_last() {
        let table = aggregate(vec![record("Sales"), record("Electrical"), record("Misc")]);
        let labels: Vec<&str> = table.all_rows().map(|r| r.job_name.as_str()).collect();
        assert_eq!(labels, vec!["Electrical", "Misc", "Sales", "Total"]);
    }

    #[test]
    fn test_total_matches_category_sums() {
        let mut a = record("A");
        a.earning_amount = dec("10.10");
        a.combined_company_and_employee_tax_amount = dec("1.01");
        let mut b = record("B");
        b.earning_amount = dec("20.20");
        b.withholding_deduction_amt = dec("3.03");
        let mut c = record("C");
        c.reimbursement_other_payment_amount = dec("0.07");
        c.other_ded = dec("0.02");

        let table = aggregate(vec![a, b, c]);
        let salary: Decimal = table.rows().iter().map(|r| r.salary).sum();
        let tax: Decimal = table.rows().iter().map(|r| r.tax).sum();
        assert_eq!(table.total().salary, salary);
        assert_eq!(table.total().tax, tax);
    }

    #[test]
    fn test_empty_input_yields_zero_total_only() {
        let table = aggregate(vec![]);
        assert!(table.rows().is_empty());
        assert_eq!(table.total().salary, Decimal::ZERO);
        assert_eq!(table.total().tax, Decimal::ZERO);
    }

    #[test]
    fn test_no_rounding_is_applied() {
        let mut r = record("Sales");
        r.earning_amount = dec("0.001");
        r.reimbursement_other_payment_amount = dec("0.0004");

        let table = aggregate(vec![r]);
        assert_eq!(table.total().salary, dec("0.0014"));
    }

    #[test]
    fn test_overflow_is_calculation_error() {
        let mut a = record("Sales");
        a.earning_amount = Decimal::MAX;
        let mut b = record("Sales");
        b.earning_amount = Decimal::MAX;

        let result = aggregate_records(&RecordSet::new(vec![a, b]), None, 1);
        assert!(matches!(result, Err(RecapError::CalculationError { .. })));
    }

    #[test]
    fn test_blank_job_names_are_left_out_of_rows_and_total() {
        let mut blank = record("");
        blank.earning_amount = dec("500");
        let mut a = record("Sales");
        a.earning_amount = dec("1234.56");
        let mut b = record("Sales");
        b.earning_amount = dec("0.2");

        let result = aggregate_records(&RecordSet::new(vec![blank, a, b]), None, 1).unwrap();
        let labels: Vec<&str> = result.table.rows().iter().map(|r| r.job_name.as_str()).collect();
        assert_eq!(labels, vec!["Sales"]);
        assert_eq!(result.table.total().salary, dec("1234.76"));
        assert_eq!(result.audit_step.input["skipped_blank_job_name"], 1);
    }

    #[test]
    fn test_audit_step_reports_totals() {
        let mut r = record("Sales");
        r.earning_amount = dec("2000.00");
        r.combined_company_and_employee_tax_amount = dec("300.00");

        let result = aggregate_records(&RecordSet::new(vec![r]), Some("2024-01-01"), 5).unwrap();
        let step = result.audit_step;
        assert_eq!(step.step_number, 5);
        assert_eq!(step.rule_id, "job_name_aggregation");
        assert_eq!(step.output["total_salary"], "2000");
        assert_eq!(step.output["total_tax"], "300");
        assert_eq!(step.input["categories"][0], "Sales");
    }
}
