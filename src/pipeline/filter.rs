//! Record filtering by job, employee and check date.
//!
//! A filter is a list of accepted values per column. A list containing
//! [`ALL_SENTINEL`] leaves that column unrestricted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Record, RecordSet};

/// The filter value meaning "do not restrict this column".
pub const ALL_SENTINEL: &str = "ALL";

/// The columns a recap can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterColumn {
    /// "Job Name".
    JobName,
    /// "Last Name and Suffix".
    LastNameAndSuffix,
    /// "Check Date".
    CheckDate,
}

impl FilterColumn {
    /// Every filter column, in the order filters are applied.
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::JobName,
        FilterColumn::LastNameAndSuffix,
        FilterColumn::CheckDate,
    ];

    /// The spreadsheet header of this column.
    pub fn header(self) -> &'static str {
        match self {
            FilterColumn::JobName => "Job Name",
            FilterColumn::LastNameAndSuffix => "Last Name and Suffix",
            FilterColumn::CheckDate => "Check Date",
        }
    }

    /// Reads this column from a record.
    pub fn value(self, record: &Record) -> &str {
        match self {
            FilterColumn::JobName => &record.job_name,
            FilterColumn::LastNameAndSuffix => &record.last_name_and_suffix,
            FilterColumn::CheckDate => &record.check_date,
        }
    }
}

fn all_values() -> Vec<String> {
    vec![ALL_SENTINEL.to_string()]
}

/// The selected values for each filter column.
///
/// Omitted columns default to `["ALL"]`. An explicitly empty list selects
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Accepted job names.
    #[serde(default = "all_values")]
    pub job_name: Vec<String>,
    /// Accepted employee surnames.
    #[serde(default = "all_values")]
    pub last_name_and_suffix: Vec<String>,
    /// Accepted check dates.
    #[serde(default = "all_values")]
    pub check_date: Vec<String>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterSelection {
    /// A selection that keeps every record.
    pub fn all() -> Self {
        Self {
            job_name: all_values(),
            last_name_and_suffix: all_values(),
            check_date: all_values(),
        }
    }

    /// Returns the selected values for a column.
    pub fn values(&self, column: FilterColumn) -> &[String] {
        match column {
            FilterColumn::JobName => &self.job_name,
            FilterColumn::LastNameAndSuffix => &self.last_name_and_suffix,
            FilterColumn::CheckDate => &self.check_date,
        }
    }

    /// Returns true if the column is left unrestricted.
    pub fn is_unrestricted(&self, column: FilterColumn) -> bool {
        self.values(column).iter().any(|v| v == ALL_SENTINEL)
    }

    fn accepts(&self, record: &Record) -> bool {
        FilterColumn::ALL.iter().all(|&column| {
            self.is_unrestricted(column)
                || self
                    .values(column)
                    .iter()
                    .any(|v| v == column.value(record))
        })
    }
}

/// Restricts a record set to the rows accepted by `selection`.
///
/// Record order is preserved. With every column unrestricted the output
/// equals the input.
///
/// # Examples
///
/// ```
/// use paychex_recap::models::{Record, RecordSet};
/// use paychex_recap::pipeline::{filter_records, FilterSelection};
///
/// let records = RecordSet::new(vec![
///     Record { job_name: "Sales".to_string(), ..Default::default() },
///     Record { job_name: "Misc".to_string(), ..Default::default() },
/// ]);
///
/// let mut selection = FilterSelection::all();
/// selection.job_name = vec!["Misc".to_string()];
///
/// let filtered = filter_records(&records, &selection);
/// assert_eq!(filtered.len(), 1);
/// assert_eq!(filtered.records()[0].job_name, "Misc");
/// ```
pub fn filter_records(records: &RecordSet, selection: &FilterSelection) -> RecordSet {
    let filtered: RecordSet = records
        .iter()
        .filter(|r| selection.accepts(r))
        .cloned()
        .collect();

    debug!(
        input = records.len(),
        output = filtered.len(),
        "Applied record filters"
    );

    filtered
}

/// The values offered for each filter column.
///
/// Each list starts with [`ALL_SENTINEL`] followed by the distinct values
/// of the column in record order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Options for "Job Name".
    pub job_name: Vec<String>,
    /// Options for "Last Name and Suffix".
    pub last_name_and_suffix: Vec<String>,
    /// Options for "Check Date".
    pub check_date: Vec<String>,
}

/// Lists the filter options available for a record set.
pub fn filter_options(records: &RecordSet) -> FilterOptions {
    let options_for = |column: FilterColumn| -> Vec<String> {
        std::iter::once(ALL_SENTINEL)
            .chain(records.distinct(|r| column.value(r)))
            .map(str::to_string)
            .collect()
    };

    FilterOptions {
        job_name: options_for(FilterColumn::JobName),
        last_name_and_suffix: options_for(FilterColumn::LastNameAndSuffix),
        check_date: options_for(FilterColumn::CheckDate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(job_name: &str, last_name: &str, check_date: &str) -> Record {
        Record {
            job_name: job_name.to_string(),
            last_name_and_suffix: last_name.to_string(),
            check_date: check_date.to_string(),
            ..Default::default()
        }
    }

    fn sample_records() -> RecordSet {
        RecordSet::new(vec![
            record("Misc", "Adams", "2024-01-01"),
            record("Office", "Baker", "2024-01-01"),
            record("Sales", "Adams", "2024-01-15"),
            record("Sales", "Chen", "2024-01-15"),
        ])
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_selection_is_identity() {
        let records = sample_records();
        let filtered = filter_records(&records, &FilterSelection::all());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_all_alongside_values_is_still_unrestricted() {
        let records = sample_records();
        let mut selection = FilterSelection::all();
        selection.job_name = strings(&["Sales", "ALL"]);

        assert_eq!(filter_records(&records, &selection), records);
    }

    #[test]
    fn test_filter_by_job_name() {
        let mut selection = FilterSelection::all();
        selection.job_name = strings(&["Sales"]);

        let filtered = filter_records(&sample_records(), &selection);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.job_name == "Sales"));
    }

    #[test]
    fn test_filters_combine_across_columns() {
        let mut selection = FilterSelection::all();
        selection.last_name_and_suffix = strings(&["Adams"]);
        selection.check_date = strings(&["2024-01-15"]);

        let filtered = filter_records(&sample_records(), &selection);
        assert_eq!(filtered.records(), &[record("Sales", "Adams", "2024-01-15")]);
    }

    #[test]
    fn test_multiple_values_are_inclusive() {
        let mut selection = FilterSelection::all();
        selection.job_name = strings(&["Misc", "Office"]);

        let filtered = filter_records(&sample_records(), &selection);
        let names: Vec<&str> = filtered.iter().map(|r| r.job_name.as_str()).collect();
        assert_eq!(names, vec!["Misc", "Office"]);
    }

    #[test]
    fn test_empty_value_list_selects_nothing() {
        let mut selection = FilterSelection::all();
        selection.check_date = vec![];

        assert!(filter_records(&sample_records(), &selection).is_empty());
    }

    #[test]
    fn test_options_start_with_all_and_keep_order() {
        let options = filter_options(&sample_records());
        assert_eq!(options.job_name, strings(&["ALL", "Misc", "Office", "Sales"]));
        assert_eq!(
            options.last_name_and_suffix,
            strings(&["ALL", "Adams", "Baker", "Chen"])
        );
        assert_eq!(
            options.check_date,
            strings(&["ALL", "2024-01-01", "2024-01-15"])
        );
    }

    #[test]
    fn test_selection_deserializes_with_defaults() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"job_name": ["Sales"]}"#).unwrap();
        assert_eq!(selection.job_name, strings(&["Sales"]));
        assert!(selection.is_unrestricted(FilterColumn::LastNameAndSuffix));
        assert!(selection.is_unrestricted(FilterColumn::CheckDate));
    }

    #[test]
    fn test_column_headers() {
        let headers: Vec<&str> = FilterColumn::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(headers, vec!["Job Name", "Last Name and Suffix", "Check Date"]);
    }
}
