//! Recap orchestration.
//!
//! Ties the stages together: classification and filtering run once over the
//! whole upload, then every check date is reclassified and aggregated on its
//! own.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::RecapRules;
use crate::error::RecapResult;
use crate::models::{AuditStep, AuditTrace, DateRecap, RecordSet};

use super::aggregate::aggregate_records;
use super::classify::classify_records;
use super::deductions::reclassify_deductions;
use super::filter::{FilterSelection, filter_records};
use super::partition::{DatePartition, partition_by_check_date};

/// Records that have been classified and filtered, ready to be recapped
/// date by date.
#[derive(Debug, Clone)]
pub struct PreparedRecords {
    /// The classified, filtered records.
    pub records: RecordSet,
    /// Audit steps recorded while preparing.
    pub audit_steps: Vec<AuditStep>,
}

impl PreparedRecords {
    /// Splits the prepared records into one partition per check date.
    pub fn partitions(&self) -> Vec<DatePartition> {
        partition_by_check_date(&self.records)
    }
}

/// Classifies the loaded records and applies the filter selection.
///
/// Step numbering starts at 1.
pub fn prepare_records(
    records: &RecordSet,
    selection: &FilterSelection,
    rules: &RecapRules,
) -> PreparedRecords {
    let classification = classify_records(records, &rules.classification, 1);
    let filtered = filter_records(&classification.records, selection);

    debug!(
        loaded = records.len(),
        selected = filtered.len(),
        "Prepared records for recap"
    );

    PreparedRecords {
        records: filtered,
        audit_steps: vec![classification.audit_step],
    }
}

/// Builds the recap for a single check date.
///
/// The partition's records go through deduction reclassification and then
/// aggregation. `step_number` numbers the first of the two audit steps.
pub fn recap_date(
    partition: &DatePartition,
    rules: &RecapRules,
    step_number: u32,
) -> RecapResult<DateRecap> {
    let check_date = partition.check_date.as_str();

    let reclassified = reclassify_deductions(
        &partition.records,
        &rules.deductions,
        Some(check_date),
        step_number,
    );
    let aggregation = aggregate_records(&reclassified.records, Some(check_date), step_number + 1)?;

    Ok(DateRecap {
        check_date: partition.check_date.clone(),
        records: reclassified.records,
        table: aggregation.table,
        audit_steps: vec![reclassified.audit_step, aggregation.audit_step],
    })
}

/// The output of a full recap run.
///
/// `outputs` holds what the per-date hook returned, one entry per recap.
#[derive(Debug, Clone)]
pub struct RecapRun<T = ()> {
    /// One recap per check date, in first-appearance order.
    pub recaps: Vec<DateRecap>,
    /// Hook results, parallel to `recaps`.
    pub outputs: Vec<T>,
    /// Every audit step of the run, in order.
    pub audit_trace: AuditTrace,
}

/// Runs the whole pipeline over loaded records.
///
/// Dates are processed sequentially and independently. The first failing
/// date ends the run.
///
/// # Examples
///
/// ```
/// use paychex_recap::config::RecapRules;
/// use paychex_recap::models::{Record, RecordSet};
/// use paychex_recap::pipeline::{build_recaps, FilterSelection};
/// use rust_decimal::Decimal;
///
/// let records = RecordSet::new(vec![
///     Record {
///         job_name: "Unassigned".to_string(),
///         primary_org_unit: "3 Maintenance".to_string(),
///         check_date: "2024-01-01".to_string(),
///         earning_amount: Decimal::new(1000, 0),
///         ..Default::default()
///     },
///     Record {
///         job_name: "Sales".to_string(),
///         check_date: "2024-01-01".to_string(),
///         earning_amount: Decimal::new(2000, 0),
///         combined_company_and_employee_tax_amount: Decimal::new(300, 0),
///         ..Default::default()
///     },
/// ]);
///
/// let run = build_recaps(&records, &FilterSelection::all(), &RecapRules::default())?;
/// let table = &run.recaps[0].table;
/// assert_eq!(table.row("Misc").unwrap().salary, Decimal::new(1000, 0));
/// assert_eq!(table.total().salary, Decimal::new(3000, 0));
/// # Ok::<(), paychex_recap::error::RecapError>(())
/// ```
pub fn build_recaps(
    records: &RecordSet,
    selection: &FilterSelection,
    rules: &RecapRules,
) -> RecapResult<RecapRun> {
    build_recaps_with(records, selection, rules, |_| Ok(()))
}

/// Runs the whole pipeline, calling `on_recap` as soon as each check date
/// is recapped.
///
/// The hook sees dates in order. An error from the hook ends the run the
/// same way a failing date does, so work the hook did for earlier dates
/// (files written, say) is kept.
pub fn build_recaps_with<T, F>(
    records: &RecordSet,
    selection: &FilterSelection,
    rules: &RecapRules,
    mut on_recap: F,
) -> RecapResult<RecapRun<T>>
where
    F: FnMut(&DateRecap) -> RecapResult<T>,
{
    let start_time = Instant::now();
    let prepared = prepare_records(records, selection, rules);

    let mut steps = prepared.audit_steps.clone();
    let mut recaps = Vec::new();
    let mut outputs = Vec::new();

    for partition in prepared.partitions() {
        let step_number = steps.len() as u32 + 1;
        let recap = recap_date(&partition, rules, step_number)?;
        outputs.push(on_recap(&recap)?);
        steps.extend(recap.audit_steps.iter().cloned());
        recaps.push(recap);
    }

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        check_dates = recaps.len(),
        records = prepared.records.len(),
        duration_us,
        "Built recaps"
    );

    Ok(RecapRun {
        recaps,
        outputs,
        audit_trace: AuditTrace { steps, duration_us },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecapError;
    use crate::models::Record;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(job_name: &str, check_date: &str, earning: &str) -> Record {
        Record {
            job_name: job_name.to_string(),
            check_date: check_date.to_string(),
            last_name_and_suffix: "Adams".to_string(),
            earning_amount: dec(earning),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_record_scenario() {
        let mut maintenance = record("Unassigned", "2024-01-01", "1000");
        maintenance.primary_org_unit = "3 Maintenance".to_string();
        let mut sales = record("Sales", "2024-01-01", "2000");
        sales.combined_company_and_employee_tax_amount = dec("300");

        let run = build_recaps(
            &RecordSet::new(vec![maintenance, sales]),
            &FilterSelection::all(),
            &RecapRules::default(),
        )
        .unwrap();

        assert_eq!(run.recaps.len(), 1);
        let table = &run.recaps[0].table;
        let misc = table.row("Misc").unwrap();
        assert_eq!((misc.salary, misc.tax), (dec("1000"), dec("0")));
        let sales = table.row("Sales").unwrap();
        assert_eq!((sales.salary, sales.tax), (dec("2000"), dec("300")));
        assert_eq!(table.total().salary, dec("3000"));
        assert_eq!(table.total().tax, dec("300"));
    }

    #[test]
    fn test_one_recap_per_check_date() {
        let records = RecordSet::new(vec![
            record("Sales", "2024-01-15", "100"),
            record("Sales", "2024-01-01", "200"),
            record("Sales", "2024-01-15", "300"),
        ]);

        let run = build_recaps(&records, &FilterSelection::all(), &RecapRules::default()).unwrap();

        let dates: Vec<&str> = run.recaps.iter().map(|r| r.check_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-01-01"]);
        assert_eq!(run.recaps[0].table.total().salary, dec("400"));
        assert_eq!(run.recaps[1].table.total().salary, dec("200"));
    }

    #[test]
    fn test_filter_runs_after_classification() {
        let mut unassigned = record("Unassigned", "2024-01-01", "50");
        unassigned.primary_org_unit = "1 Administrative".to_string();
        let records = RecordSet::new(vec![unassigned, record("Sales", "2024-01-01", "75")]);

        let mut selection = FilterSelection::all();
        selection.job_name = vec!["Office".to_string()];

        let run = build_recaps(&records, &selection, &RecapRules::default()).unwrap();
        let labels: Vec<&str> = run.recaps[0]
            .table
            .all_rows()
            .map(|r| r.job_name.as_str())
            .collect();
        assert_eq!(labels, vec!["Office", "Total"]);
    }

    #[test]
    fn test_empty_selection_produces_no_recaps() {
        let records = RecordSet::new(vec![record("Sales", "2024-01-01", "75")]);
        let mut selection = FilterSelection::all();
        selection.check_date = vec!["2030-01-01".to_string()];

        let run = build_recaps(&records, &selection, &RecapRules::default()).unwrap();
        assert!(run.recaps.is_empty());
        assert_eq!(run.audit_trace.steps.len(), 1);
    }

    #[test]
    fn test_deductions_flow_into_totals() {
        let mut union = record("Sales", "2024-01-01", "1000");
        union.withholding_deduction_name = Some("Union Dues".to_string());
        union.withholding_deduction_amt = dec("40");
        let mut child = record("Sales", "2024-01-01", "0");
        child.withholding_deduction_name = Some("Child Support".to_string());
        child.withholding_deduction_amt = dec("25");

        let run = build_recaps(
            &RecordSet::new(vec![union, child]),
            &FilterSelection::all(),
            &RecapRules::default(),
        )
        .unwrap();

        let sales = run.recaps[0].table.row("Sales").unwrap();
        // Salary: 1000 - 40 other ded
        assert_eq!(sales.salary, dec("960"));
        // Tax: 0 - 65 withholding + 40 other ded + 25 child support
        assert_eq!(sales.tax, dec("0"));
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let records = RecordSet::new(vec![
            record("Sales", "2024-01-01", "1"),
            record("Sales", "2024-01-15", "1"),
        ]);

        let run = build_recaps(&records, &FilterSelection::all(), &RecapRules::default()).unwrap();
        let numbers: Vec<u32> = run.audit_trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(run.recaps[1].audit_steps[0].step_number, 4);
    }

    #[test]
    fn test_hook_runs_once_per_date_in_order() {
        let records = RecordSet::new(vec![
            record("Sales", "2024-01-15", "100"),
            record("Sales", "2024-01-01", "200"),
            record("Field", "2024-01-15", "300"),
        ]);

        let mut seen = Vec::new();
        let run = build_recaps_with(
            &records,
            &FilterSelection::all(),
            &RecapRules::default(),
            |recap| {
                seen.push(recap.check_date.clone());
                Ok(recap.table.total().salary)
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["2024-01-15", "2024-01-01"]);
        assert_eq!(run.outputs, vec![dec("400"), dec("200")]);
        assert_eq!(run.recaps.len(), run.outputs.len());
    }

    #[test]
    fn test_hook_error_stops_later_dates() {
        let records = RecordSet::new(vec![
            record("Sales", "2024-01-01", "100"),
            record("Sales", "2024-01-15", "200"),
            record("Sales", "2024-02-01", "300"),
        ]);

        let mut calls = 0;
        let result = build_recaps_with(
            &records,
            &FilterSelection::all(),
            &RecapRules::default(),
            |recap| {
                calls += 1;
                if recap.check_date == "2024-01-15" {
                    return Err(RecapError::ExportError {
                        file_name: "QB Recap 2024-01-15.xlsx".to_string(),
                        message: "disk full".to_string(),
                    });
                }
                Ok(())
            },
        );

        assert!(matches!(result, Err(RecapError::ExportError { .. })));
        assert_eq!(calls, 2);
    }
}
