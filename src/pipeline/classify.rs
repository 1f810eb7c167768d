//! Job-name classification.
//!
//! Paychex exports rows without a job as "Unassigned". This module replaces
//! that sentinel with a real category based on the employee's primary org
//! unit.

use tracing::debug;

use crate::config::ClassificationRules;
use crate::models::{AuditStep, Record, RecordSet};

/// The result of classifying a record set, including the audit step.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// The classified records, sorted by job name.
    pub records: RecordSet,
    /// The audit step recording this classification.
    pub audit_step: AuditStep,
}

/// Replaces the sentinel job name on every record.
///
/// Records whose job name equals `rules.sentinel` become
/// `rules.maintenance_job_name` when their org unit is
/// `rules.maintenance_org_unit`, and `rules.default_job_name` otherwise.
/// All other records pass through untouched. The output is stably sorted by
/// job name, so reapplying the classification is a no-op.
///
/// # Examples
///
/// ```
/// use paychex_recap::config::ClassificationRules;
/// use paychex_recap::models::{Record, RecordSet};
/// use paychex_recap::pipeline::classify_records;
///
/// let records = RecordSet::new(vec![
///     Record {
///         job_name: "Unassigned".to_string(),
///         primary_org_unit: "3 Maintenance".to_string(),
///         ..Default::default()
///     },
///     Record {
///         job_name: "Unassigned".to_string(),
///         primary_org_unit: "1 Administrative".to_string(),
///         ..Default::default()
///     },
/// ]);
///
/// let result = classify_records(&records, &ClassificationRules::default(), 1);
/// let names: Vec<&str> = result.records.iter().map(|r| r.job_name.as_str()).collect();
/// assert_eq!(names, vec!["Misc", "Office"]);
/// ```
pub fn classify_records(
    records: &RecordSet,
    rules: &ClassificationRules,
    step_number: u32,
) -> ClassificationResult {
    let mut maintenance_count: usize = 0;
    let mut default_count: usize = 0;

    let mut classified: Vec<Record> = records
        .iter()
        .cloned()
        .map(|mut record| {
            if record.job_name == rules.sentinel {
                if record.primary_org_unit == rules.maintenance_org_unit {
                    record.job_name = rules.maintenance_job_name.clone();
                    maintenance_count += 1;
                } else {
                    record.job_name = rules.default_job_name.clone();
                    default_count += 1;
                }
            }
            record
        })
        .collect();

    // Stable, so rows keep their upload order within a job.
    classified.sort_by(|a, b| a.job_name.cmp(&b.job_name));

    debug!(
        records = records.len(),
        maintenance = maintenance_count,
        default = default_count,
        "Classified sentinel job names"
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "job_name_classification".to_string(),
        rule_name: "Job Name Classification".to_string(),
        check_date: None,
        input: serde_json::json!({
            "records": records.len(),
            "sentinel": rules.sentinel,
            "maintenance_org_unit": rules.maintenance_org_unit
        }),
        output: serde_json::json!({
            "reassigned_to_maintenance": maintenance_count,
            "reassigned_to_default": default_count
        }),
        reasoning: format!(
            "{} '{}' rows in '{}' became '{}'; {} other '{}' rows became '{}'",
            maintenance_count,
            rules.sentinel,
            rules.maintenance_org_unit,
            rules.maintenance_job_name,
            default_count,
            rules.sentinel,
            rules.default_job_name
        ),
    };

    ClassificationResult {
        records: RecordSet::new(classified),
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(job_name: &str, org_unit: &str) -> Record {
        Record {
            job_name: job_name.to_string(),
            primary_org_unit: org_unit.to_string(),
            check_date: "2024-01-01".to_string(),
            ..Default::default()
        }
    }

    fn job_names(records: &RecordSet) -> Vec<&str> {
        records.iter().map(|r| r.job_name.as_str()).collect()
    }

    #[test]
    fn test_unassigned_maintenance_becomes_misc() {
        let records = RecordSet::new(vec![record("Unassigned", "3 Maintenance")]);
        let result = classify_records(&records, &ClassificationRules::default(), 1);
        assert_eq!(job_names(&result.records), vec!["Misc"]);
    }

    #[test]
    fn test_unassigned_other_org_unit_becomes_office() {
        let records = RecordSet::new(vec![
            record("Unassigned", "1 Administrative"),
            record("Unassigned", ""),
        ]);
        let result = classify_records(&records, &ClassificationRules::default(), 1);
        assert_eq!(job_names(&result.records), vec!["Office", "Office"]);
    }

    #[test]
    fn test_assigned_rows_keep_job_name() {
        let records = RecordSet::new(vec![record("Sales", "3 Maintenance")]);
        let result = classify_records(&records, &ClassificationRules::default(), 1);
        assert_eq!(job_names(&result.records), vec!["Sales"]);
    }

    #[test]
    fn test_no_sentinel_survives() {
        let records = RecordSet::new(vec![
            record("Unassigned", "3 Maintenance"),
            record("Unassigned", "2 Field"),
            record("Roofing", "2 Field"),
        ]);
        let result = classify_records(&records, &ClassificationRules::default(), 1);
        assert!(result.records.iter().all(|r| r.job_name != "Unassigned"));
    }

    #[test]
    fn test_output_sorted_by_job_name() {
        let records = RecordSet::new(vec![
            record("Sales", ""),
            record("Unassigned", "3 Maintenance"),
            record("Electrical", ""),
            record("Unassigned", ""),
        ]);
        let result = classify_records(&records, &ClassificationRules::default(), 1);
        assert_eq!(
            job_names(&result.records),
            vec!["Electrical", "Misc", "Office", "Sales"]
        );
    }

    #[test]
    fn test_sort_is_stable_within_job() {
        let mut first = record("Sales", "");
        first.last_name_and_suffix = "Adams".to_string();
        let mut second = record("Sales", "");
        second.last_name_and_suffix = "Baker".to_string();
        let records = RecordSet::new(vec![record("Roofing", ""), first, second]);

        let result = classify_records(&records, &ClassificationRules::default(), 1);
        let surnames: Vec<&str> = result
            .records
            .iter()
            .map(|r| r.last_name_and_suffix.as_str())
            .collect();
        assert_eq!(surnames, vec!["", "Adams", "Baker"]);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let records = RecordSet::new(vec![
            record("Unassigned", "3 Maintenance"),
            record("Unassigned", "1 Administrative"),
            record("Sales", ""),
        ]);
        let rules = ClassificationRules::default();
        let once = classify_records(&records, &rules, 1).records;
        let twice = classify_records(&once, &rules, 2).records;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let records = RecordSet::new(vec![record("Unassigned", "3 Maintenance")]);
        let _ = classify_records(&records, &ClassificationRules::default(), 1);
        assert_eq!(records.records()[0].job_name, "Unassigned");
    }

    #[test]
    fn test_audit_step_counts_reassignments() {
        let records = RecordSet::new(vec![
            record("Unassigned", "3 Maintenance"),
            record("Unassigned", "1 Administrative"),
            record("Unassigned", "2 Field"),
        ]);
        let result = classify_records(&records, &ClassificationRules::default(), 3);

        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "job_name_classification");
        assert_eq!(result.audit_step.output["reassigned_to_maintenance"], 1);
        assert_eq!(result.audit_step.output["reassigned_to_default"], 2);
    }

    #[test]
    fn test_custom_rules_are_honoured() {
        let rules = ClassificationRules {
            sentinel: "(none)".to_string(),
            maintenance_org_unit: "Shop".to_string(),
            maintenance_job_name: "Shop Labor".to_string(),
            default_job_name: "Admin".to_string(),
        };
        let records = RecordSet::new(vec![record("(none)", "Shop"), record("Unassigned", "")]);
        let result = classify_records(&records, &rules, 1);
        assert_eq!(job_names(&result.records), vec!["Shop Labor", "Unassigned"]);
    }
}
