//! Recap pipeline for the Paychex recap engine.
//!
//! Each stage is a pure transform that takes a record set by reference and
//! returns a new value: job-name classification, record filtering, splitting
//! by check date, deduction reclassification, and aggregation into salary and
//! tax per job name.

mod aggregate;
mod classify;
mod deductions;
mod filter;
mod partition;
mod recap;

pub use aggregate::{AggregationResult, aggregate_records};
pub use classify::{ClassificationResult, classify_records};
pub use deductions::{ReclassificationResult, reclassify_deductions};
pub use filter::{
    ALL_SENTINEL, FilterColumn, FilterOptions, FilterSelection, filter_options, filter_records,
};
pub use partition::{DatePartition, partition_by_check_date};
pub use recap::{
    PreparedRecords, RecapRun, build_recaps, build_recaps_with, prepare_records, recap_date,
};
