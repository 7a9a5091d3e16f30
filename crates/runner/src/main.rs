use connector_coinbase::run_connector;
use connector_core::{create_event_channel, ConnectorConfig};
use metrics::create_metrics;
use slippage_monitor::{MonitorConfig, SlippageMonitor};
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Interval for periodic health status logging.
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Capacity of the report channel between the monitor and stdout.
const REPORT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let mut monitor_config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(product_id) = std::env::args().nth(1) {
        monitor_config = monitor_config.with_product_id(product_id);
    }

    let precision = monitor_config.report_precision;
    let connector_config =
        ConnectorConfig::for_product(monitor_config.product_id.clone()).with_env_overrides();

    info!(
        product_id = %monitor_config.product_id,
        environment = %connector_config.environment,
        channels = ?connector_config.channels,
        "Starting slippage monitor"
    );

    if connector_config.environment.is_sandbox() {
        warn!("Using the sandbox feed, prices are synthetic");
    }

    let metrics = create_metrics();

    let monitor = match SlippageMonitor::new(monitor_config, metrics.clone()) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let (sender, receiver) = create_event_channel(connector_config.channel_capacity);
    let (report_tx, mut report_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn connector task
    let connector_metrics = metrics.clone();
    let connector_shutdown_rx = shutdown_rx.clone();
    let connector_handle = tokio::spawn(async move {
        if let Err(e) =
            run_connector(connector_config, sender, connector_shutdown_rx, connector_metrics).await
        {
            error!(error = %e, "Connector error");
        }
    });

    // Spawn ctrl_c handler
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, initiating shutdown");
            let _ = shutdown_tx_clone.send(true);
        }
    });

    // Spawn periodic health reporter
    let health_metrics = metrics.clone();
    let mut health_shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEALTH_LOG_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let snapshot = health_metrics.snapshot();
                    info!(
                        status = %snapshot.health_status(),
                        messages = snapshot.messages_received,
                        msgs_per_sec = format!("{:.1}", snapshot.messages_per_second),
                        ticks = snapshot.ticks_completed,
                        errors = snapshot.error_count(),
                        reconnects = snapshot.reconnect_attempts,
                        "Health check"
                    );
                }
                _ = health_shutdown_rx.changed() => {
                    if *health_shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });

    let monitor_handle = tokio::spawn(monitor.run(receiver, report_tx, shutdown_rx));

    // Print reports as they arrive
    while let Some(report) = report_rx.recv().await {
        println!("{:.*}", precision, report);
    }

    info!("Report channel closed, waiting for tasks to finish");

    let mut exit = ExitCode::SUCCESS;
    match monitor_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(error = %e, "Monitor stopped");
            exit = ExitCode::FAILURE;
        }
        Err(e) => {
            error!(error = %e, "Monitor task panicked");
            exit = ExitCode::FAILURE;
        }
    }

    // Make sure the connector stops even if the monitor exited on its own
    let _ = shutdown_tx.send(true);
    let _ = connector_handle.await;

    // Print final metrics
    let snapshot = metrics.snapshot();
    println!("\n{}", snapshot);

    info!("Shutdown complete");
    exit
}
