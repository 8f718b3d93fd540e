use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crib_monitor::poll::{shutdown_channel, MonitorChannels, Notifier, PollLoop};
use crib_monitor::{
    load_config, AlertSeverity, CribSimulator, MonitorResult, TickMetrics, visualization,
};

// ============================================================================
// CONSOLE NOTIFIER - stands in for the push transport in the demo
// ============================================================================

struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn dispatch(
        &self,
        title: &str,
        body: &str,
        severity: AlertSeverity,
    ) -> MonitorResult<()> {
        println!("[ALERT/{}] {}: {}", severity, title, body);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("===========================================");
    println!("Starting Crib Monitor Session");
    println!("===========================================\n");

    let mut config = load_config("config/monitor_config.toml");
    // Demo pacing: tick every second, report every 5 ticks.
    config.poll_interval_secs = 1;
    config.report_every_ticks = 5;

    let simulator = Arc::new(CribSimulator::new(42));
    let channels = MonitorChannels::new(256);
    let metrics = TickMetrics::new();
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let poll_loop = PollLoop::new(
        config,
        simulator.clone(),
        None,
        Arc::new(ConsoleNotifier),
        channels.clone(),
        metrics.clone(),
        shutdown_rx,
    );
    let session = tokio::spawn(poll_loop.run());

    println!("Session running for 10 seconds...\n");
    tokio::time::sleep(Duration::from_secs(5)).await;

    info!("injecting fever disturbance");
    simulator.inject_fever(1.8);

    tokio::time::sleep(Duration::from_secs(5)).await;

    shutdown_tx.send(true).ok();
    let engine = session.await.expect("poll loop panicked");

    println!("\n===========================================");
    println!("SESSION RESULTS");
    println!("===========================================");

    let alerts = engine.recent_alerts();
    println!("Alerts fired: {}", alerts.len());
    for alert in &alerts {
        println!("- [{}] {} ({})", alert.severity, alert.message, alert.timestamp);
    }

    let report = engine.health_report(&engine.temperature_history(), &[], &[], Utc::now());
    println!("\n=== Health Report ===");
    println!("Temperature status: {:?}", report.temperature.status);
    println!("Temperature average: {:?}", report.temperature.average);
    println!("Trend: {:?}", report.temperature.trend);
    println!("Overall: {:?}", report.overall);
    for rec in &report.recommendations {
        println!("Recommendation: {}", rec);
    }

    let summary = metrics.summary();
    println!("\n=== Cycle Metrics ===");
    println!("Cycles: {}", summary.cycles);
    println!("Fetch P50: {:?}, P99: {:?}", summary.fetch_p50, summary.fetch_p99);
    println!(
        "Evaluate P50: {:?}, P99: {:?}",
        summary.evaluate_p50, summary.evaluate_p99
    );

    if let Err(e) = visualization::render_temperature_chart(
        &engine.temperature_history(),
        "temperature_trend.png",
    ) {
        eprintln!("chart rendering failed: {}", e);
    }
}
