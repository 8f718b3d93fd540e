//! Configuration - thresholds, trailing windows, and poll cadence

use serde::Deserialize;
use tracing::warn;

// ============================================================================
// MONITOR CONFIG
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
    /// Health report cadence, in poll ticks.
    pub report_every_ticks: u64,
    pub thresholds: AlertThresholds,
    pub windows: AnalysisWindows,
    /// Expected rest windows as inclusive local-hour ranges. Absence
    /// inside these windows is normal and not flagged as stillness.
    pub rest_windows: Vec<RestWindow>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Temperature above this fires a High alert.
    pub temp_high: f64,
    /// Temperature below this fires a Low alert.
    pub temp_low: f64,
    /// Expected normal temperature, the anomaly baseline.
    pub temp_baseline: f64,
    /// Above this a High temperature alert escalates to Critical.
    pub fever_critical: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnalysisWindows {
    /// Trailing window for the crying-frequency rule.
    pub crying_window_hours: i64,
    /// Crying episodes above this count are anomalous.
    pub crying_frequency_limit: usize,
    /// Trailing window for numeric trend statistics.
    pub trend_window_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl RestWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temp_high: 37.5,
            temp_low: 35.5,
            temp_baseline: 36.5,
            fever_critical: 38.5,
        }
    }
}

impl Default for AnalysisWindows {
    fn default() -> Self {
        Self {
            crying_window_hours: 24,
            crying_frequency_limit: 15,
            trend_window_days: 7,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            report_every_ticks: 60,
            thresholds: AlertThresholds::default(),
            windows: AnalysisWindows::default(),
            // Typical nap times: early morning, early afternoon, evening.
            rest_windows: vec![
                RestWindow { start_hour: 5, end_hour: 7 },
                RestWindow { start_hour: 13, end_hour: 15 },
                RestWindow { start_hour: 20, end_hour: 22 },
            ],
        }
    }
}

// ============================================================================
// CONFIG FILE LOADING
// ============================================================================

pub fn load_config(path: &str) -> MonitorConfig {
    match std::fs::read_to_string(path) {
        Ok(s) => match toml::from_str::<MonitorConfig>(&s) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path, error = %e, "config file unparseable, using defaults");
                MonitorConfig::default()
            }
        },
        Err(_) => MonitorConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_constants() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.thresholds.temp_high, 37.5);
        assert_eq!(cfg.thresholds.temp_low, 35.5);
        assert_eq!(cfg.windows.crying_frequency_limit, 15);
        assert_eq!(cfg.rest_windows.len(), 3);
    }

    #[test]
    fn rest_window_bounds_are_inclusive() {
        let w = RestWindow { start_hour: 13, end_hour: 15 };
        assert!(w.contains(13));
        assert!(w.contains(15));
        assert!(!w.contains(16));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg: MonitorConfig = toml::from_str("poll_interval_secs = 2").unwrap();
        assert_eq!(cfg.poll_interval_secs, 2);
        assert_eq!(cfg.thresholds.temp_high, 37.5);
    }
}
