//! Payroll record model and related types.
//!
//! This module defines the [`Record`] struct, one line item of a Paychex
//! payroll export, and the ordered [`RecordSet`] the pipeline stages pass
//! between each other.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One payroll line item.
///
/// Amount fields hold the raw spreadsheet values; blank cells load as zero.
/// `child_support_401k` and `other_ded` are derived columns filled by the
/// deduction reclassifier and stay zero until then.
///
/// # Example
///
/// ```
/// use paychex_recap::models::Record;
/// use rust_decimal::Decimal;
///
/// let record = Record {
///     job_name: "Sales".to_string(),
///     check_date: "2024-01-01".to_string(),
///     earning_amount: Decimal::new(2000, 0),
///     ..Default::default()
/// };
/// assert_eq!(record.other_ded, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The job category ("Job Name").
    pub job_name: String,
    /// The employee's primary organizational unit ("Primary Org Unit").
    pub primary_org_unit: String,
    /// The pay date this line belongs to ("Check Date").
    pub check_date: String,
    /// The employee's surname ("Last Name and Suffix").
    pub last_name_and_suffix: String,
    /// Free-text deduction label ("Withholding-Deduction Name").
    #[serde(default)]
    pub withholding_deduction_name: Option<String>,
    /// "Withholding-Deduction Amt".
    pub withholding_deduction_amt: Decimal,
    /// "Earning Amount".
    pub earning_amount: Decimal,
    /// "Reimbursement-Other Payment Amount".
    pub reimbursement_other_payment_amount: Decimal,
    /// "Combined Company and Employee Tax Amount".
    pub combined_company_and_employee_tax_amount: Decimal,
    /// Derived "Child Support/401k" amount.
    #[serde(default)]
    pub child_support_401k: Decimal,
    /// Derived "Other Ded" amount.
    #[serde(default)]
    pub other_ded: Decimal,
}

impl Record {
    /// Returns true if the deduction name contains `keyword`.
    ///
    /// Matching is a case-sensitive substring test. Records without a
    /// deduction name never match.
    pub fn deduction_name_contains(&self, keyword: &str) -> bool {
        self.withholding_deduction_name
            .as_deref()
            .is_some_and(|name| name.contains(keyword))
    }
}

/// An ordered sequence of payroll records sharing one schema.
///
/// Records have no identity beyond their values; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Creates a record set from records in the given order.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Returns the records as a slice.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the set and returns the underlying records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Appends every record of `other`, keeping order.
    pub fn extend(&mut self, other: RecordSet) {
        self.records.extend(other.records);
    }

    /// Returns the distinct values produced by `key`, in first-appearance
    /// order.
    ///
    /// # Example
    ///
    /// ```
    /// use paychex_recap::models::{Record, RecordSet};
    ///
    /// let set = RecordSet::new(vec![
    ///     Record { check_date: "2024-01-15".to_string(), ..Default::default() },
    ///     Record { check_date: "2024-01-01".to_string(), ..Default::default() },
    ///     Record { check_date: "2024-01-15".to_string(), ..Default::default() },
    /// ]);
    /// let dates = set.distinct(|r| r.check_date.as_str());
    /// assert_eq!(dates, vec!["2024-01-15", "2024-01-01"]);
    /// ```
    pub fn distinct<'a, F>(&'a self, key: F) -> Vec<&'a str>
    where
        F: Fn(&'a Record) -> &'a str,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut values = Vec::new();
        for record in &self.records {
            let value = key(record);
            if seen.insert(value) {
                values.push(value);
            }
        }
        values
    }

    /// Returns the distinct check dates in first-appearance order.
    pub fn check_dates(&self) -> Vec<&str> {
        self.distinct(|r| r.check_date.as_str())
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
