/*!
 * Pressure Simulator - Main Entry Point
 *
 * Wires configuration, tracing, the pressure monitor, and the HTTP surface,
 * then waits for either Ctrl+C (graceful exit) or a termination request
 * from the escalation policy (exit with a dedicated status code).
 */

use anyhow::Context;
use pressure_sim::api::{self, AppState};
use pressure_sim::core::limits::TERMINATION_EXIT_CODE;
use pressure_sim::{init_tracing, Config, EscalationAction, MonitorTask, PressureSimulator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Why the process is stopping
enum Exit {
    Interrupted,
    Escalated(EscalationAction),
    ServerStopped,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.trace_json);

    info!("Pressure simulator starting...");
    info!(
        threshold_mb = config.threshold.threshold_mb,
        sample_interval_ms = config.threshold.sample_interval_ms,
        max_consecutive_failures = config.threshold.max_consecutive_failures,
        max_allocation_mb = config.max_allocation_mb,
        "Configuration loaded"
    );

    let interval = config.threshold.sample_interval();
    let listen_addr = config.listen_addr.clone();

    let (simulator, mut escalations) = PressureSimulator::new(config);
    let simulator = Arc::new(simulator);

    info!("Starting pressure monitor...");
    let monitor = MonitorTask::spawn(Arc::clone(&simulator), interval);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener to {}", listen_addr))?;

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let state = AppState::new(Arc::clone(&simulator));
    let mut server = tokio::spawn(api::serve(listener, state, async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    }));

    info!("Pressure simulator ready - press Ctrl+C to exit");

    let exit = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl+C; shutting down");
            }
            Exit::Interrupted
        }
        Some(action) = escalations.recv() => Exit::Escalated(action),
        result = &mut server => {
            match result {
                Ok(Ok(())) => warn!("HTTP server exited unexpectedly"),
                Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
                Err(e) => error!(error = %e, "HTTP server task panicked"),
            }
            Exit::ServerStopped
        }
    };

    let _ = stop_tx.send(true);
    monitor.shutdown().await;

    match exit {
        Exit::Interrupted => {
            if let Err(e) = server.await {
                warn!(error = %e, "HTTP server task did not stop cleanly");
            }
            info!("Pressure simulator stopped");
            Ok(())
        }
        Exit::Escalated(EscalationAction::TerminateProcess { consecutive_failures }) => {
            error!(
                consecutive_failures,
                exit_code = TERMINATION_EXIT_CODE,
                "Terminating process after repeated allocation failures"
            );
            std::process::exit(TERMINATION_EXIT_CODE);
        }
        Exit::ServerStopped => anyhow::bail!("HTTP server stopped"),
    }
}
