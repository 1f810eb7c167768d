//! Core data models for the recap engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod recap;
mod record;

pub use audit::{AuditStep, AuditTrace};
pub use recap::{AggregateRow, DateRecap, RecapTable, TOTAL_LABEL};
pub use record::{Record, RecordSet};
