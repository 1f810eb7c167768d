//! Deduction reclassification.
//!
//! Some withholding deductions are booked differently in the recap: child
//! support and 401k contributions count towards tax, union dues and similar
//! items are moved out of salary. This module copies the matching deduction
//! amounts into the derived `child_support_401k` and `other_ded` columns.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::DeductionRules;
use crate::models::{AuditStep, Record, RecordSet};

/// The result of reclassifying deductions, including the audit step.
#[derive(Debug, Clone)]
pub struct ReclassificationResult {
    /// The records with derived columns filled in.
    pub records: RecordSet,
    /// The audit step recording this reclassification.
    pub audit_step: AuditStep,
}

/// Copies matching deduction amounts into the derived columns.
///
/// Derived columns start at zero. Then, for each keyword of
/// `rules.child_support_401k_keywords` in order, every record whose deduction
/// name contains the keyword gets `child_support_401k` overwritten with its
/// withholding amount; `rules.other_deduction_keywords` fill `other_ded` the
/// same way. A later keyword overwrites an earlier one for the same record;
/// matches are never summed.
///
/// # Examples
///
/// ```
/// use paychex_recap::config::DeductionRules;
/// use paychex_recap::models::{Record, RecordSet};
/// use paychex_recap::pipeline::reclassify_deductions;
/// use rust_decimal::Decimal;
///
/// let records = RecordSet::new(vec![Record {
///     withholding_deduction_name: Some("Union Dues".to_string()),
///     withholding_deduction_amt: Decimal::new(45, 0),
///     ..Default::default()
/// }]);
///
/// let result = reclassify_deductions(&records, &DeductionRules::default(), None, 1);
/// let record = &result.records.records()[0];
/// assert_eq!(record.other_ded, Decimal::new(45, 0));
/// assert_eq!(record.child_support_401k, Decimal::ZERO);
/// ```
pub fn reclassify_deductions(
    records: &RecordSet,
    rules: &DeductionRules,
    check_date: Option<&str>,
    step_number: u32,
) -> ReclassificationResult {
    let mut reclassified: Vec<Record> = records
        .iter()
        .cloned()
        .map(|mut record| {
            record.child_support_401k = Decimal::ZERO;
            record.other_ded = Decimal::ZERO;
            record
        })
        .collect();

    let child_support_matches = overwrite_matches(
        &mut reclassified,
        &rules.child_support_401k_keywords,
        |record| &mut record.child_support_401k,
    );
    let other_matches = overwrite_matches(
        &mut reclassified,
        &rules.other_deduction_keywords,
        |record| &mut record.other_ded,
    );

    debug!(
        check_date = check_date.unwrap_or(""),
        records = reclassified.len(),
        child_support_401k_matches = ?child_support_matches,
        other_deduction_matches = ?other_matches,
        "Reclassified deductions"
    );

    let total_matches: usize = child_support_matches
        .iter()
        .chain(other_matches.iter())
        .map(|(_, count)| count)
        .sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "deduction_reclassification".to_string(),
        rule_name: "Deduction Reclassification".to_string(),
        check_date: check_date.map(str::to_string),
        input: serde_json::json!({
            "records": records.len(),
            "child_support_401k_keywords": rules.child_support_401k_keywords,
            "other_deduction_keywords": rules.other_deduction_keywords
        }),
        output: serde_json::json!({
            "child_support_401k_matches": keyword_counts_json(&child_support_matches),
            "other_deduction_matches": keyword_counts_json(&other_matches)
        }),
        reasoning: format!(
            "{} keyword matches copied deduction amounts into derived columns (last match wins)",
            total_matches
        ),
    };

    ReclassificationResult {
        records: RecordSet::new(reclassified),
        audit_step,
    }
}

/// Runs one keyword list over the records, overwriting the column picked by
/// `column` on every match. Returns the match count per keyword.
fn overwrite_matches<F>(
    records: &mut [Record],
    keywords: &[String],
    column: F,
) -> Vec<(String, usize)>
where
    F: Fn(&mut Record) -> &mut Decimal,
{
    keywords
        .iter()
        .map(|keyword| {
            let mut count = 0;
            for record in records.iter_mut() {
                if record.deduction_name_contains(keyword) {
                    let amount = record.withholding_deduction_amt;
                    *column(record) = amount;
                    count += 1;
                }
            }
            (keyword.clone(), count)
        })
        .collect()
}

fn keyword_counts_json(counts: &[(String, usize)]) -> serde_json::Value {
    counts
        .iter()
        .map(|(keyword, count)| serde_json::json!({ "keyword": keyword, "matches": count }))
        .collect()
}
