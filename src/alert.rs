//! Alert module - per-signal level tracking and transition-edge alerts
//!
//! The state machine fires at most one alert per signal per excursion:
//! a signal crossing its threshold emits once, stays silent while the
//! abnormal state persists, re-arms when the signal returns to normal.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::AlertThresholds;
use crate::reading::{PresenceState, Reading, Signal, SoundState};

// ============================================================================
// ALERT TYPES
// ============================================================================

/// Discrete per-signal alert state. Temperature uses all three levels,
/// sound and presence only `None`/`High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertLevel {
    #[default]
    None,
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "Low"),
            AlertSeverity::Medium => write!(f, "Medium"),
            AlertSeverity::High => write!(f, "High"),
            AlertSeverity::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
    pub signal: Signal,
    pub value: String,
}

// ============================================================================
// ALERT STATE MACHINE
// ============================================================================

/// Per-signal last-fired levels. Session lifetime only; a restart
/// re-arms every signal.
#[derive(Debug, Clone, Copy, Default)]
struct AlertMemory {
    temperature: AlertLevel,
    sound: AlertLevel,
    presence: AlertLevel,
}

pub struct AlertStateMachine {
    thresholds: AlertThresholds,
    memory: AlertMemory,
    next_id: u64,
}

impl AlertStateMachine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            memory: AlertMemory::default(),
            next_id: 1,
        }
    }

    /// Evaluate one reading against all signals and return the alerts
    /// emitted by level transitions. Unknown values retain the previous
    /// level and never emit.
    pub fn evaluate(&mut self, reading: &Reading) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let temp_target = self.temperature_level(reading.temperature);
        if let Some(fired) = self.transition(Signal::Temperature, temp_target) {
            alerts.push(self.make_temperature_alert(fired, reading));
        }

        let sound_target = match reading.sound {
            SoundState::Crying => Some(AlertLevel::High),
            SoundState::Quiet => Some(AlertLevel::None),
            SoundState::Unknown => None,
        };
        if let Some(AlertLevel::High) = self.transition(Signal::Sound, sound_target) {
            alerts.push(self.make_alert(
                "Baby is crying!".to_string(),
                AlertSeverity::Medium,
                reading.timestamp,
                Signal::Sound,
                reading.sound.to_string(),
            ));
        }

        let presence_target = match reading.presence {
            PresenceState::Absent => Some(AlertLevel::High),
            PresenceState::Present => Some(AlertLevel::None),
            PresenceState::Unknown => None,
        };
        if let Some(AlertLevel::High) = self.transition(Signal::Presence, presence_target) {
            alerts.push(self.make_alert(
                "Baby not detected in crib!".to_string(),
                AlertSeverity::High,
                reading.timestamp,
                Signal::Presence,
                reading.presence.to_string(),
            ));
        }

        alerts
    }

    pub fn current_level(&self, signal: Signal) -> AlertLevel {
        match signal {
            Signal::Temperature => self.memory.temperature,
            Signal::Sound => self.memory.sound,
            Signal::Presence => self.memory.presence,
            Signal::Sleep => AlertLevel::None,
        }
    }

    fn temperature_level(&self, temp: f64) -> Option<AlertLevel> {
        if !temp.is_finite() {
            // Malformed value: treat as unknown, keep previous state.
            return None;
        }
        if temp > self.thresholds.temp_high {
            Some(AlertLevel::High)
        } else if temp < self.thresholds.temp_low {
            Some(AlertLevel::Low)
        } else {
            Some(AlertLevel::None)
        }
    }

    /// Apply a target level to a signal. Returns the level fired if the
    /// target is an abnormal level different from the current one;
    /// `None` target means no update at all.
    fn transition(&mut self, signal: Signal, target: Option<AlertLevel>) -> Option<AlertLevel> {
        let target = target?;
        let slot = match signal {
            Signal::Temperature => &mut self.memory.temperature,
            Signal::Sound => &mut self.memory.sound,
            Signal::Presence => &mut self.memory.presence,
            Signal::Sleep => return None,
        };
        if *slot == target {
            return None;
        }
        *slot = target;
        match target {
            // Returning to normal re-arms silently.
            AlertLevel::None => None,
            level => Some(level),
        }
    }

    fn make_temperature_alert(&mut self, level: AlertLevel, reading: &Reading) -> Alert {
        let (message, severity) = match level {
            AlertLevel::High => {
                let severity = if reading.temperature > self.thresholds.fever_critical {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::High
                };
                (
                    format!("High temperature detected: {:.1}\u{b0}C", reading.temperature),
                    severity,
                )
            }
            _ => (
                format!("Low temperature detected: {:.1}\u{b0}C", reading.temperature),
                AlertSeverity::Medium,
            ),
        };
        self.make_alert(
            message,
            severity,
            reading.timestamp,
            Signal::Temperature,
            format!("{:.1}", reading.temperature),
        )
    }

    fn make_alert(
        &mut self,
        message: String,
        severity: AlertSeverity,
        timestamp: DateTime<Utc>,
        signal: Signal,
        value: String,
    ) -> Alert {
        let id = self.next_id;
        self.next_id += 1;
        Alert {
            id,
            message,
            severity,
            timestamp,
            signal,
            value,
        }
    }
}

// ============================================================================
// ALERT LOG - capped display retention, shared with the query surface
// ============================================================================

#[derive(Clone)]
pub struct AlertLog {
    entries: Arc<RwLock<VecDeque<Alert>>>,
    max_size: usize,
}

impl AlertLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn record(&self, alert: Alert) {
        let mut log = self.entries.write();
        log.push_front(alert);
        if log.len() > self.max_size {
            log.pop_back();
        }
    }

    /// Newest-first list of retained alerts.
    pub fn recent(&self) -> Vec<Alert> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SleepState;
    use chrono::TimeZone;

    fn reading(temp: f64, sound: SoundState, presence: PresenceState) -> Reading {
        Reading {
            temperature: temp,
            sound,
            presence,
            sleep: SleepState::Unknown,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn machine() -> AlertStateMachine {
        AlertStateMachine::new(AlertThresholds::default())
    }

    #[test]
    fn high_excursion_fires_once() {
        let mut sm = machine();
        let first = sm.evaluate(&reading(38.0, SoundState::Quiet, PresenceState::Present));
        assert_eq!(first.len(), 1);
        for _ in 0..5 {
            let again = sm.evaluate(&reading(38.2, SoundState::Quiet, PresenceState::Present));
            assert!(again.is_empty(), "no re-emission while High persists");
        }
    }

    #[test]
    fn return_to_normal_is_silent_and_re_arms() {
        let mut sm = machine();
        sm.evaluate(&reading(38.0, SoundState::Quiet, PresenceState::Present));
        let back = sm.evaluate(&reading(36.8, SoundState::Quiet, PresenceState::Present));
        assert!(back.is_empty(), "no alert on recovery");
        let second = sm.evaluate(&reading(38.0, SoundState::Quiet, PresenceState::Present));
        assert_eq!(second.len(), 1, "new excursion fires again");
    }

    #[test]
    fn unknown_retains_previous_state() {
        let mut sm = machine();
        sm.evaluate(&reading(36.8, SoundState::Crying, PresenceState::Present));
        assert_eq!(sm.current_level(Signal::Sound), AlertLevel::High);
        let alerts = sm.evaluate(&reading(36.8, SoundState::Unknown, PresenceState::Present));
        assert!(alerts.is_empty());
        assert_eq!(sm.current_level(Signal::Sound), AlertLevel::High);
    }

    #[test]
    fn fever_above_critical_threshold_escalates() {
        let mut sm = machine();
        let alerts = sm.evaluate(&reading(38.9, SoundState::Quiet, PresenceState::Present));
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn alert_log_caps_retention() {
        let mut sm = machine();
        let log = AlertLog::new(3);
        for i in 0..5 {
            // Alternate to force a transition each time.
            let temp = if i % 2 == 0 { 38.0 } else { 36.8 };
            for alert in sm.evaluate(&reading(temp, SoundState::Quiet, PresenceState::Present)) {
                log.record(alert);
            }
        }
        assert!(log.len() <= 3);
    }
}
