//! Poll loop - the cancellable driver around the pure decision core
//!
//! One loop per monitoring session. Each tick runs fetch -> ingestion ->
//! alert evaluation to completion before the next tick is considered;
//! `MissedTickBehavior::Delay` guarantees a slow cycle delays the next
//! tick instead of overlapping it, so a fetch is never double-scheduled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crossbeam::channel::{bounded, Receiver, Sender};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::alert::{Alert, AlertSeverity};
use crate::analytics::report::HealthReport;
use crate::config::MonitorConfig;
use crate::engine::MonitorEngine;
use crate::error::MonitorResult;
use crate::history::HistoryEntry;
use crate::metrics::TickMetrics;
use crate::reading::{ActivityEntry, Reading, SignalValue, SleepSession};

/// How many entries per log to pull from the external store when
/// building a health report.
pub const HISTORY_READ_LIMIT: usize = 100;

// ============================================================================
// COLLABORATOR SEAMS
// ============================================================================

/// Produces the current sensor snapshot. A failure means "no update
/// this cycle", never a crash.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn current(&self) -> MonitorResult<Reading>;
}

/// External history persistence. Append-only from the engine's
/// perspective; the engine never deletes entries.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, value: SignalValue, timestamp: DateTime<Utc>) -> MonitorResult<()>;
    async fn recent_temperatures(&self, limit: usize) -> MonitorResult<Vec<HistoryEntry<f64>>>;
    async fn recent_sleep_sessions(&self, limit: usize) -> MonitorResult<Vec<SleepSession>>;
    async fn recent_activity(&self, limit: usize) -> MonitorResult<Vec<ActivityEntry>>;
}

/// Push-notification transport. Fire-and-forget: failures are logged
/// and never block the poll cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, title: &str, body: &str, severity: AlertSeverity)
        -> MonitorResult<()>;
}

// ============================================================================
// MONITOR CHANNELS - alert and report streams for the presentation layer
// ============================================================================

#[derive(Clone)]
pub struct MonitorChannels {
    pub alert_tx: Sender<Alert>,
    pub alert_rx: Arc<Receiver<Alert>>,
    pub report_tx: Sender<HealthReport>,
    pub report_rx: Arc<Receiver<HealthReport>>,
}

impl MonitorChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (alert_tx, alert_rx) = bounded(buffer_size);
        let (report_tx, report_rx) = bounded(buffer_size);

        Self {
            alert_tx,
            alert_rx: Arc::new(alert_rx),
            report_tx,
            report_rx: Arc::new(report_rx),
        }
    }
}

/// Session shutdown flag. Flip the sender to true to stop the loop.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

// ============================================================================
// POLL LOOP
// ============================================================================

pub struct PollLoop {
    engine: MonitorEngine,
    source: Arc<dyn ReadingSource>,
    store: Option<Arc<dyn HistoryStore>>,
    notifier: Arc<dyn Notifier>,
    channels: MonitorChannels,
    metrics: TickMetrics,
    config: MonitorConfig,
    shutdown: watch::Receiver<bool>,
}

impl PollLoop {
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn ReadingSource>,
        store: Option<Arc<dyn HistoryStore>>,
        notifier: Arc<dyn Notifier>,
        channels: MonitorChannels,
        metrics: TickMetrics,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine: MonitorEngine::new(&config),
            source,
            store,
            notifier,
            channels,
            metrics,
            config,
            shutdown,
        }
    }

    /// Drive the session until shutdown. Returns the engine so callers
    /// can inspect final state; dropping it discards the session.
    pub async fn run(mut self) -> MonitorEngine {
        let mut ticker = interval(Duration::from_secs(self.config.poll_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.shutdown.clone();
        let mut tick_count: u64 = 0;

        info!(
            interval_secs = self.config.poll_interval_secs,
            "monitoring session started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tick_count += 1;
                    self.run_cycle(tick_count).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(ticks = tick_count, "monitoring session stopped");
        self.engine
    }

    /// One complete cycle: fetch, ingest, evaluate, dispatch, and at
    /// the report cadence, aggregate.
    async fn run_cycle(&mut self, tick: u64) {
        let now = Utc::now();

        let fetch_start = Instant::now();
        let reading = match self.source.current().await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "no reading this cycle, serving last-known state");
                self.engine.mark_stale();
                return;
            }
        };
        self.metrics.record_fetch(fetch_start.elapsed());

        let eval_start = Instant::now();
        let outcome = self.engine.tick(reading, now);
        self.metrics.record_evaluate(eval_start.elapsed());

        // Mirror the entries that were actually written (dedup already
        // applied) into the external store.
        if let Some(store) = &self.store {
            for (value, ts) in &outcome.appended {
                if let Err(e) = store.append(value.clone(), *ts).await {
                    warn!(signal = %value.signal(), error = %e, "history append failed");
                }
            }
        }

        for alert in &outcome.alerts {
            let title = alert.signal.to_string();
            if let Err(e) = self
                .notifier
                .dispatch(&title, &alert.message, alert.severity)
                .await
            {
                // The alert is already recorded for dedup; delivery
                // failure only loses this one notification.
                warn!(alert_id = alert.id, error = %e, "notification dispatch failed");
            }
            if self.channels.alert_tx.try_send(alert.clone()).is_err() {
                debug!(alert_id = alert.id, "alert stream full or disconnected");
            }
        }

        if outcome.anomalies.has_anomalies {
            debug!(
                count = outcome.anomalies.anomalies.len(),
                risk = ?outcome.anomalies.risk_level,
                "anomalies detected"
            );
        }

        if tick % self.config.report_every_ticks.max(1) == 0 {
            let report_start = Instant::now();
            let report = self.build_report(now).await;
            self.metrics.record_report(report_start.elapsed());
            if self.channels.report_tx.try_send(report).is_err() {
                debug!("report stream full or disconnected");
            }
        }
    }

    /// Aggregate a health report from the external store when present,
    /// falling back to the in-memory buffers. Store failures degrade to
    /// the sentinel-filled report rather than erroring the cycle.
    async fn build_report(&self, now: DateTime<Utc>) -> HealthReport {
        let (temperatures, sleep, activity) = match &self.store {
            Some(store) => {
                let temperatures = match store.recent_temperatures(HISTORY_READ_LIMIT).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(error = %e, "temperature history unavailable, using in-memory buffer");
                        self.engine.temperature_history()
                    }
                };
                let sleep = store
                    .recent_sleep_sessions(HISTORY_READ_LIMIT)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "sleep history unavailable");
                        Vec::new()
                    });
                let activity = store
                    .recent_activity(HISTORY_READ_LIMIT)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "activity history unavailable");
                        Vec::new()
                    });
                (temperatures, sleep, activity)
            }
            None => (self.engine.temperature_history(), Vec::new(), Vec::new()),
        };

        self.engine.health_report(&temperatures, &sleep, &activity, now)
    }
}
