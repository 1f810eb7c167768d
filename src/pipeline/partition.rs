//! Splitting a record set by check date.

use crate::models::RecordSet;

/// The records of a single check date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePartition {
    /// The check date shared by every record in the partition.
    pub check_date: String,
    /// The records, in their original order.
    pub records: RecordSet,
}

/// Splits records into one partition per distinct check date.
///
/// Partitions come back in the order their check date first appears, and
/// each partition keeps the original record order.
pub fn partition_by_check_date(records: &RecordSet) -> Vec<DatePartition> {
    records
        .check_dates()
        .into_iter()
        .map(|check_date| DatePartition {
            check_date: check_date.to_string(),
            records: records
                .iter()
                .filter(|r| r.check_date == check_date)
                .cloned()
                .collect(),
        })
        .collect()
}
