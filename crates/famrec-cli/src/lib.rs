//! CLI library components for the family reconciliation import.

pub mod config;
pub mod logging;
pub mod sinks;
