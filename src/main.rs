use anyhow::Context;
use stock_compare::alpha_vantage::AlphaVantageClient;
use stock_compare::config::{self, AppConfig};
use stock_compare::server::{self, AppState, SharedSource};
use stock_compare::utils::{CachedSource, init_tracing};
use stock_compare::worker;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_config = AppConfig::load().context("failed to load configuration")?;

    tracing::info!("Starting stock-compare");
    tracing::info!(
        environment = %app_config.environment,
        port = app_config.port,
        interval = %app_config.client.interval,
        cache_ttl_secs = app_config.cache_ttl.as_secs(),
        "Loaded configuration"
    );

    let stocks = config::load_popular_stocks(app_config.popular_stocks_file.as_deref())
        .context("failed to load popular stocks")?;

    let client = AlphaVantageClient::new(app_config.client.clone())
        .context("failed to build Alpha Vantage client")?;

    let source: SharedSource = if app_config.cache_ttl.is_zero() {
        tracing::info!("Series cache disabled");
        Arc::new(client)
    } else {
        let cached = Arc::new(CachedSource::new(client, app_config.cache_ttl));
        tracing::info!("Spawning cache janitor");
        tokio::spawn(worker::run_cache_janitor(cached.clone(), app_config.cache_ttl));
        cached
    };

    let app_state = AppState::new(source, stocks, &app_config.environment);

    tracing::info!("Registering routes:");
    tracing::info!("  GET  /api/stocks");
    tracing::info!("  POST /api/compare");
    tracing::info!("  GET  /health");

    let app = server::router(
        app_state,
        app_config.compare_limit,
        app_config.static_dir.as_deref(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;

    Ok(())
}
