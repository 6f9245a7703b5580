//! Point Cache - command line driver
//!
//! Reads newline-delimited JSON point requests from stdin on behalf of one
//! user and prints every created point. Statistics are printed on exit.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use point_cache::models::{PointRequest, Principal};
use point_cache::{AppState, Config};

/// Main entry point for the point cache driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the application state
/// 4. Start the statistics consumer and the cache maintenance task
/// 5. Process stdin until EOF, Ctrl+C or SIGTERM
/// 6. Print statistics and shut the background tasks down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "point_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting point cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_max_entries={}, cache_ttl={}s, maintenance_interval={}s, miss_threshold={}, topic={}",
        config.cache_max_entries,
        config.cache_ttl_secs,
        config.cache_maintenance_interval,
        config.miss_threshold,
        config.notification_topic
    );

    let state = AppState::from_config(&config);
    let consumer_handle = state.start_statistics_consumer();
    let maintenance_handle = state.start_cache_maintenance(config.cache_maintenance_interval);
    info!("Background tasks started");

    let principal = Principal::new(Uuid::new_v4(), config.username.clone());
    info!(user_id = %principal.user_id, username = %principal.username, "Reading point requests from stdin");

    tokio::select! {
        result = process_input(&state, &principal) => result?,
        _ = shutdown_signal() => {}
    }

    // Let the consumer drain what was already published
    state.bus.close();
    if tokio::time::timeout(std::time::Duration::from_secs(1), consumer_handle)
        .await
        .is_err()
    {
        warn!("Statistics consumer did not finish in time");
    }
    maintenance_handle.abort();

    let snapshot = state.statistics.snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("serializing statistics")?
    );
    let cache_stats = state.cache.stats();
    println!(
        "{}",
        serde_json::to_string_pretty(&cache_stats).context("serializing cache stats")?
    );

    info!("Shutdown complete");
    Ok(())
}

/// Creates a point for every valid request line until stdin is exhausted.
///
/// Malformed lines and rejected requests are logged and skipped.
async fn process_input(state: &AppState, principal: &Principal) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: PointRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "Skipping malformed point request");
                continue;
            }
        };

        match state.points.create(principal, request).await {
            Ok(point) => println!("{}", serde_json::to_string(&point)?),
            Err(err) => warn!(error = %err, "Point creation failed"),
        }
    }

    info!("End of input");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
