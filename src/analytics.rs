//! Analytics module - anomaly classification, trend statistics, health reports

pub mod anomaly;
pub mod report;
pub mod trend;
