use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cleaner::SystemYear,
    config::Config,
    handlers::{self, predict::AppState},
    metrics,
    pricing::PricingService,
    signals::setup_signal_handlers,
};

/// Requests are a handful of short strings and two integers
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Start the pricing server
///
/// This function:
/// 1. Loads the reference dataset and the three price oracles
/// 2. Initializes metrics
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    info!("Car pricer starting...");

    let http_client = reqwest::Client::new();
    let pricer = PricingService::from_config(&config, &http_client)
        .context("Failed to load pricing data")?;

    let stats = pricer.vocabulary().stats();
    info!(
        "Vocabulary: {} makes, {} models, {} trims",
        stats.makes, stats.models, stats.trims
    );

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()))
    } else {
        None
    };

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        pricer: Arc::new(pricer),
        clock: Arc::new(SystemYear),
    };

    let app = create_router(&config, app_state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting car pricer on {}", addr);
    info!(
        "Oracles: retail={}, private={}, trade_in={}; gap={} (enforced: {})",
        config.oracles.retail.kind(),
        config.oracles.private.kind(),
        config.oracles.trade_in.kind(),
        config.pricing.gap,
        config.pricing.enforce_gap
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: &Config,
    app_state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
) -> Router {
    let mut router = Router::new()
        .route("/predict", post(handlers::predict::handle_predict))
        .route("/healthz", get(handlers::health::health_check))
        .with_state(app_state);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route(
                &config.metrics.endpoint,
                get(handlers::metrics_handler::metrics),
            )
            .with_state(handle);
        router = router.merge(metrics_routes);
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
