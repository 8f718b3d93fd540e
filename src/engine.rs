//! Engine module - session-scoped owner of monitoring state
//!
//! One `MonitorEngine` instance per monitoring session. It exclusively
//! owns the alert memory and the per-signal history buffers; nothing
//! else mutates them, so two engines (e.g. in concurrent tests) never
//! interfere. Discarding the engine discards all session state.

use chrono::{DateTime, Utc};

use crate::alert::{Alert, AlertLog, AlertStateMachine};
use crate::analytics::anomaly::{AnomalyDetector, AnomalyReport};
use crate::analytics::report::{self, HealthReport, HealthReportBuilder, SleepInsights};
use crate::config::MonitorConfig;
use crate::history::{HistoryBuffer, HistoryEntry};
use crate::reading::{
    ActivityEntry, PresenceState, Reading, SignalValue, SleepSession, SleepState, SoundState,
};

/// Display retention for fired alerts.
pub const ALERT_RETENTION: usize = 50;

// ============================================================================
// TICK OUTCOME
// ============================================================================

/// What one ingestion cycle produced: alerts fired by level
/// transitions, the anomaly classification of the reading, and the
/// history entries that were actually written (dedup respected), for
/// mirroring into an external store.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub alerts: Vec<Alert>,
    pub anomalies: AnomalyReport,
    pub appended: Vec<(SignalValue, DateTime<Utc>)>,
}

#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub last_reading: Option<Reading>,
    /// True when the most recent fetch failed and `last_reading` is
    /// older than one poll interval.
    pub stale: bool,
}

// ============================================================================
// MONITOR ENGINE
// ============================================================================

pub struct MonitorEngine {
    alerts: AlertStateMachine,
    alert_log: AlertLog,
    detector: AnomalyDetector,
    report_builder: HealthReportBuilder,

    temperature: HistoryBuffer<f64>,
    sound: HistoryBuffer<SoundState>,
    presence: HistoryBuffer<PresenceState>,
    sleep: HistoryBuffer<SleepState>,

    last_reading: Option<Reading>,
    stale: bool,
}

impl MonitorEngine {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            alerts: AlertStateMachine::new(config.thresholds),
            alert_log: AlertLog::new(ALERT_RETENTION),
            detector: AnomalyDetector::new(
                config.thresholds,
                config.windows,
                config.rest_windows.clone(),
            ),
            report_builder: HealthReportBuilder::new(config.windows),
            temperature: HistoryBuffer::new(),
            sound: HistoryBuffer::new(),
            presence: HistoryBuffer::new(),
            sleep: HistoryBuffer::new(),
            last_reading: None,
            stale: false,
        }
    }

    /// Run one ingestion cycle: append the reading to the per-signal
    /// buffers (dedup on write), evaluate alert transitions, classify
    /// anomalies against the recent sound history. Unknown or
    /// non-finite values are skipped during ingestion so missing data
    /// never pollutes the statistics.
    pub fn tick(&mut self, reading: Reading, now: DateTime<Utc>) -> TickOutcome {
        let mut appended = Vec::new();
        let ts = reading.timestamp;

        if reading.temperature.is_finite() && self.temperature.append(reading.temperature, ts) {
            appended.push((SignalValue::Temperature(reading.temperature), ts));
        }
        if reading.sound != SoundState::Unknown && self.sound.append(reading.sound, ts) {
            appended.push((SignalValue::Sound(reading.sound), ts));
        }
        if reading.presence != PresenceState::Unknown && self.presence.append(reading.presence, ts)
        {
            appended.push((SignalValue::Presence(reading.presence), ts));
        }
        if reading.sleep != SleepState::Unknown && self.sleep.append(reading.sleep, ts) {
            appended.push((SignalValue::Sleep(reading.sleep), ts));
        }

        let alerts = self.alerts.evaluate(&reading);
        for alert in &alerts {
            // Recorded as fired here, before any dispatch attempt, so a
            // failed delivery never causes a duplicate emission.
            self.alert_log.record(alert.clone());
        }

        let anomalies = self.detector.detect(&reading, &self.sound.snapshot(), now);

        self.last_reading = Some(reading);
        self.stale = false;

        TickOutcome {
            alerts,
            anomalies,
            appended,
        }
    }

    /// Mark the session stale: the source produced nothing this cycle
    /// and queries are served from the last-known reading.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            last_reading: self.last_reading.clone(),
            stale: self.stale,
        }
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// Classify a reading without ingesting it.
    pub fn anomaly_report(&self, reading: &Reading, now: DateTime<Utc>) -> AnomalyReport {
        self.detector.detect(reading, &self.sound.snapshot(), now)
    }

    pub fn sleep_insights(&self, sessions: &[SleepSession], now: DateTime<Utc>) -> SleepInsights {
        report::sleep_insights(sessions, now)
    }

    pub fn health_report(
        &self,
        temperature: &[HistoryEntry<f64>],
        sleep: &[SleepSession],
        activity: &[ActivityEntry],
        now: DateTime<Utc>,
    ) -> HealthReport {
        self.report_builder.build(temperature, sleep, activity, now)
    }

    /// Newest-first alerts retained for display, capped at
    /// [`ALERT_RETENTION`].
    pub fn recent_alerts(&self) -> Vec<Alert> {
        self.alert_log.recent()
    }

    /// Shared handle to the alert log for external query surfaces.
    pub fn alert_log(&self) -> AlertLog {
        self.alert_log.clone()
    }

    /// Newest-first snapshot of the in-memory temperature history.
    pub fn temperature_history(&self) -> Vec<HistoryEntry<f64>> {
        self.temperature.snapshot()
    }

    /// Newest-first snapshot of the in-memory sound history. Each
    /// `Crying` entry is one crying episode (dedup on write collapses
    /// consecutive identical states).
    pub fn sound_history(&self) -> Vec<HistoryEntry<SoundState>> {
        self.sound.snapshot()
    }
}
