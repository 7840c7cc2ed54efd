//! Clinic appointments dashboard: filtering, snapshot metrics and period
//! comparisons over a CSV of appointment records.

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod dashboard;
pub mod filter;
pub mod format;
pub mod metrics;
pub mod models;
pub mod report;
pub mod source;
