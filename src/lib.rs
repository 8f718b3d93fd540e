//! Analytics and alerting core for a crib monitoring device.
//!
//! Turns a stream of periodic sensor snapshots into deduplicated alert
//! transitions, classified anomalies, trend statistics, and aggregated
//! health reports. The UI, backend sync, and notification transport are
//! external collaborators behind the traits in [`poll`].

pub mod alert;
pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod poll;
pub mod reading;
pub mod simulator;
pub mod visualization;

pub use alert::{Alert, AlertLevel, AlertLog, AlertSeverity, AlertStateMachine};
pub use analytics::anomaly::{Anomaly, AnomalyDetector, AnomalyReport, RiskLevel};
pub use analytics::report::{HealthReport, HealthReportBuilder, OverallHealth, SleepInsights};
pub use analytics::trend::{SleepQuality, TrendDirection};
pub use config::{load_config, MonitorConfig};
pub use engine::{MonitorEngine, TickOutcome};
pub use error::{MonitorError, MonitorResult};
pub use history::{HistoryBuffer, HistoryEntry};
pub use metrics::TickMetrics;
pub use poll::{
    shutdown_channel, HistoryStore, MonitorChannels, Notifier, PollLoop, ReadingSource,
};
pub use reading::{
    ActivityEntry, ActivityLevel, PresenceState, Reading, Signal, SignalValue, SleepSession,
    SleepState, SoundState,
};
pub use simulator::CribSimulator;
