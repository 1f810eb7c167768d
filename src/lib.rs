//! Payroll recap engine for Paychex export workbooks
//!
//! This crate reads the "Paychex Data" sheet of one or more Paychex payroll
//! exports, classifies unassigned job names, reclassifies deductions by
//! keyword, and aggregates salary and tax per job name for every check date.
//! Each recap is exported as a QuickBooks workbook and a PDF report.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod pipeline;
