//! Daemon wiring: runtime connection, startup top-up, REST API.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use podpool_core::ScalerConfig;
use podpool_runtime::DockerRuntime;
use podpool_scaler::Scaler;
use tracing::{error, info, warn};

/// Run the scaler until Ctrl-C.
pub async fn run(config: ScalerConfig, host: IpAddr, port: u16) -> anyhow::Result<()> {
    info!(
        image = %config.image,
        prefix = %config.prefix,
        min = config.min_containers,
        max = config.max_containers,
        stop_timeout_secs = config.stop_timeout_secs,
        "podpoold starting"
    );

    // ── Runtime ──────────────────────────────────────────────────
    let runtime = DockerRuntime::connect_handle().await;
    let scaler = Scaler::new(runtime, Arc::new(config));

    // ── Startup top-up ───────────────────────────────────────────
    let report = scaler.reconcile_startup().await;
    match &report.error {
        None => info!(
            previous = report.previous_count,
            created = report.created.len(),
            "startup reconciliation done"
        ),
        Some(e) => warn!(
            previous = report.previous_count,
            created = report.created.len(),
            error = %e,
            "startup reconciliation incomplete"
        ),
    }

    // ── REST API server ──────────────────────────────────────────
    let router = podpool_api::build_router(scaler);
    let api_addr = SocketAddr::new(host, port);

    info!(%api_addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("podpoold stopped");
    Ok(())
}
