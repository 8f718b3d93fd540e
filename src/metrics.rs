//! Metrics module - poll-cycle latency tracking

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TICK METRICS - Thread-safe per-phase latency tracking
// ============================================================================

#[derive(Clone)]
pub struct TickMetrics {
    fetch_hist: Arc<Mutex<Histogram<u64>>>,
    evaluate_hist: Arc<Mutex<Histogram<u64>>>,
    report_hist: Arc<Mutex<Histogram<u64>>>,
}

impl TickMetrics {
    pub fn new() -> Self {
        Self {
            fetch_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            evaluate_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            report_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
        }
    }

    pub fn record_fetch(&self, duration: Duration) {
        self.fetch_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    pub fn record_evaluate(&self, duration: Duration) {
        self.evaluate_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    pub fn record_report(&self, duration: Duration) {
        self.report_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    pub fn summary(&self) -> MetricsSummary {
        let fetch = self.fetch_hist.lock();
        let evaluate = self.evaluate_hist.lock();
        let report = self.report_hist.lock();

        MetricsSummary {
            fetch_p50: Duration::from_nanos(fetch.value_at_quantile(0.5)),
            fetch_p99: Duration::from_nanos(fetch.value_at_quantile(0.99)),
            evaluate_p50: Duration::from_nanos(evaluate.value_at_quantile(0.5)),
            evaluate_p99: Duration::from_nanos(evaluate.value_at_quantile(0.99)),
            report_p50: Duration::from_nanos(report.value_at_quantile(0.5)),
            report_p99: Duration::from_nanos(report.value_at_quantile(0.99)),
            cycles: fetch.len(),
        }
    }
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS SUMMARY
// ============================================================================

#[derive(Debug)]
pub struct MetricsSummary {
    pub fetch_p50: Duration,
    pub fetch_p99: Duration,
    pub evaluate_p50: Duration,
    pub evaluate_p99: Duration,
    pub report_p50: Duration,
    pub report_p99: Duration,
    pub cycles: u64,
}
