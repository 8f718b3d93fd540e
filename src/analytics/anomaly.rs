//! Anomaly detection - rule-based classification of a reading
//!
//! Rules are independent and all applicable ones fire, in a fixed order
//! so reports are reproducible. An anomaly is richer than an alert: it
//! carries a severity, a human message, and a recommendation.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{AlertThresholds, AnalysisWindows, RestWindow};
use crate::history::HistoryEntry;
use crate::reading::{PresenceState, Reading, SoundState};

// ============================================================================
// ANOMALY TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    Temperature,
    Crying,
    Movement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
    pub message: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub has_anomalies: bool,
    pub anomalies: Vec<Anomaly>,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// ANOMALY DETECTOR
// ============================================================================

/// Degrees above the baseline that read as a fever-range anomaly.
pub const FEVER_MARGIN: f64 = 2.0;
/// Degrees below the baseline that read as a cold-range anomaly.
pub const COLD_MARGIN: f64 = 1.5;

pub struct AnomalyDetector {
    thresholds: AlertThresholds,
    windows: AnalysisWindows,
    rest_windows: Vec<RestWindow>,
}

impl AnomalyDetector {
    pub fn new(
        thresholds: AlertThresholds,
        windows: AnalysisWindows,
        rest_windows: Vec<RestWindow>,
    ) -> Self {
        Self {
            thresholds,
            windows,
            rest_windows,
        }
    }

    /// Classify a reading against the recent sound history. Rules fire
    /// independently; a reading can carry several anomalies at once.
    pub fn detect(
        &self,
        reading: &Reading,
        sound_history: &[HistoryEntry<SoundState>],
        now: DateTime<Utc>,
    ) -> AnomalyReport {
        let mut anomalies = Vec::new();
        let baseline = self.thresholds.temp_baseline;

        // 1. Fever range
        if reading.temperature > baseline + FEVER_MARGIN {
            anomalies.push(Anomaly {
                kind: AnomalyKind::Temperature,
                severity: AnomalySeverity::High,
                message: format!(
                    "High temperature: {:.1}\u{b0}C (Normal: {:.1}\u{b0}C)",
                    reading.temperature, baseline
                ),
                recommendation: format!(
                    "Check if baby has fever. Contact doctor if > {:.1}\u{b0}C",
                    self.thresholds.fever_critical
                ),
            });
        }

        // 2. Cold range
        if reading.temperature < baseline - COLD_MARGIN {
            anomalies.push(Anomaly {
                kind: AnomalyKind::Temperature,
                severity: AnomalySeverity::Medium,
                message: format!("Low temperature: {:.1}\u{b0}C", reading.temperature),
                recommendation: "Ensure baby is warm. Check if blankets are sufficient."
                    .to_string(),
            });
        }

        // 3. Crying frequency. A single crying event is not anomalous;
        //    only an unusually high episode count in the trailing window
        //    is. Too little history simply yields nothing.
        if reading.sound == SoundState::Crying {
            if let Some(anomaly) = self.crying_frequency(sound_history, now) {
                anomalies.push(anomaly);
            }
        }

        // 4. Stillness outside expected rest windows
        if reading.presence == PresenceState::Absent && !self.is_rest_time(now) {
            anomalies.push(Anomaly {
                kind: AnomalyKind::Movement,
                severity: AnomalySeverity::Medium,
                message: "Baby is very still during active hours".to_string(),
                recommendation: "Check on baby. Ensure they are comfortable.".to_string(),
            });
        }

        AnomalyReport {
            has_anomalies: !anomalies.is_empty(),
            risk_level: risk_level(&anomalies),
            anomalies,
            timestamp: now,
        }
    }

    fn crying_frequency(
        &self,
        sound_history: &[HistoryEntry<SoundState>],
        now: DateTime<Utc>,
    ) -> Option<Anomaly> {
        let cutoff = now - Duration::hours(self.windows.crying_window_hours);
        let episodes = sound_history
            .iter()
            .filter(|e| e.value == SoundState::Crying && e.timestamp > cutoff)
            .count();

        if episodes > self.windows.crying_frequency_limit {
            Some(Anomaly {
                kind: AnomalyKind::Crying,
                severity: AnomalySeverity::Medium,
                message: format!(
                    "Excessive crying detected ({} times in {}h)",
                    episodes, self.windows.crying_window_hours
                ),
                recommendation: "Check for diaper, hunger, or discomfort. Soothe baby gently."
                    .to_string(),
            })
        } else {
            None
        }
    }

    fn is_rest_time(&self, now: DateTime<Utc>) -> bool {
        let hour = now.hour();
        self.rest_windows.iter().any(|w| w.contains(hour))
    }
}

/// Coarse roll-up of a report's anomalies: any High-severity anomaly or
/// more than two anomalies of any kind reads as high risk.
pub fn risk_level(anomalies: &[Anomaly]) -> RiskLevel {
    if anomalies.is_empty() {
        return RiskLevel::Low;
    }
    if anomalies.iter().any(|a| a.severity == AnomalySeverity::High) {
        return RiskLevel::High;
    }
    if anomalies.len() > 2 {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::reading::SleepState;
    use chrono::TimeZone;

    fn detector() -> AnomalyDetector {
        let cfg = MonitorConfig::default();
        AnomalyDetector::new(cfg.thresholds, cfg.windows, cfg.rest_windows)
    }

    fn active_hour() -> DateTime<Utc> {
        // 10:00 is outside every default rest window.
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn reading(temp: f64, sound: SoundState, presence: PresenceState) -> Reading {
        Reading {
            temperature: temp,
            sound,
            presence,
            sleep: SleepState::Unknown,
            timestamp: active_hour(),
        }
    }

    fn crying_history(count: usize, now: DateTime<Utc>) -> Vec<HistoryEntry<SoundState>> {
        (0..count)
            .map(|i| HistoryEntry {
                value: SoundState::Crying,
                timestamp: now - Duration::minutes(i as i64 * 10),
            })
            .collect()
    }

    #[test]
    fn fever_rule_fires_high() {
        let report = detector().detect(
            &reading(38.6, SoundState::Quiet, PresenceState::Present),
            &[],
            active_hour(),
        );
        assert!(report.has_anomalies);
        assert_eq!(report.anomalies[0].severity, AnomalySeverity::High);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.anomalies[0].message.contains("38.6"));
        assert!(report.anomalies[0].message.contains("36.5"));
    }

    #[test]
    fn cold_rule_fires_medium() {
        let report = detector().detect(
            &reading(34.9, SoundState::Quiet, PresenceState::Present),
            &[],
            active_hour(),
        );
        assert_eq!(report.anomalies[0].severity, AnomalySeverity::Medium);
        assert_eq!(report.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn sixteen_crying_episodes_are_anomalous_fifteen_are_not() {
        let now = active_hour();
        let d = detector();

        let report = d.detect(
            &reading(36.5, SoundState::Crying, PresenceState::Present),
            &crying_history(16, now),
            now,
        );
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].kind, AnomalyKind::Crying);

        let report = d.detect(
            &reading(36.5, SoundState::Crying, PresenceState::Present),
            &crying_history(15, now),
            now,
        );
        assert!(!report.has_anomalies, "a single crying event alone is not anomalous");
    }

    #[test]
    fn crying_outside_window_is_not_counted() {
        let now = active_hour();
        let stale: Vec<HistoryEntry<SoundState>> = (0..20)
            .map(|i| HistoryEntry {
                value: SoundState::Crying,
                timestamp: now - Duration::hours(25 + i),
            })
            .collect();
        let report = detector().detect(
            &reading(36.5, SoundState::Crying, PresenceState::Present),
            &stale,
            now,
        );
        assert!(!report.has_anomalies);
    }

    #[test]
    fn stillness_respects_rest_windows() {
        let d = detector();
        let napping = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();

        let during_nap = d.detect(
            &reading(36.5, SoundState::Quiet, PresenceState::Absent),
            &[],
            napping,
        );
        assert!(!during_nap.has_anomalies, "absence during rest windows is expected");

        let active = d.detect(
            &reading(36.5, SoundState::Quiet, PresenceState::Absent),
            &[],
            active_hour(),
        );
        assert_eq!(active.anomalies[0].kind, AnomalyKind::Movement);
    }

    #[test]
    fn three_medium_anomalies_roll_up_to_high_risk() {
        let now = active_hour();
        // Cold + excessive crying + stillness, none individually High.
        let report = detector().detect(
            &reading(34.9, SoundState::Crying, PresenceState::Absent),
            &crying_history(16, now),
            now,
        );
        assert_eq!(report.anomalies.len(), 3);
        assert!(report
            .anomalies
            .iter()
            .all(|a| a.severity == AnomalySeverity::Medium));
        assert_eq!(report.risk_level, RiskLevel::High);
    }
}
