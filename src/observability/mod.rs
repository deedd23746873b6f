//! # Observability
//!
//! Observability modules for metrics and structured failure reporting.
//!
//! - `metrics`: Prometheus metrics collection
//! - `report`: structured failure records for the log sink

pub mod metrics;
pub mod report;

pub use report::FailureReport;
