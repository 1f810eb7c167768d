//! Audit trace models.
//!
//! Each pipeline stage records what it decided in an [`AuditStep`] so a
//! recap can be explained after the fact.

use serde::{Deserialize, Serialize};

/// What one pipeline stage did to the records it was given.
///
/// `input` and `output` hold stage-specific JSON summaries: counts, the
/// keywords that matched, or the rows produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// Position in the run, starting at 1.
    pub step_number: u32,
    /// Stable stage id, e.g. `deduction_reclassification`.
    pub rule_id: String,
    /// Display name of the stage.
    pub rule_name: String,
    /// Set for stages that run once per check date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_date: Option<String>,
    /// Summary of the records the stage received.
    pub input: serde_json::Value,
    /// Summary of what the stage produced.
    pub output: serde_json::Value,
    /// One-sentence account of the stage's decisions.
    pub reasoning: String,
}

/// Every step of one recap run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// Steps ordered by `step_number`.
    pub steps: Vec<AuditStep>,
    /// Wall time of the run in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Steps recorded for one check date.
    pub fn steps_for<'a>(&'a self, check_date: &'a str) -> impl Iterator<Item = &'a AuditStep> {
        self.steps
            .iter()
            .filter(move |step| step.check_date.as_deref() == Some(check_date))
    }
}
