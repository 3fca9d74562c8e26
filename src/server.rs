use crate::alpha_vantage::SeriesSource;
use crate::api;
use crate::config::CompareLimit;
use crate::data_structures::SharedStockList;
use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub type SharedSource = Arc<dyn SeriesSource>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub stocks: SharedStockList,
    pub environment: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(source: SharedSource, stocks: SharedStockList, environment: &str) -> Self {
        Self {
            source,
            stocks,
            environment: Arc::from(environment),
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for SharedSource {
    fn from_ref(app_state: &AppState) -> SharedSource {
        app_state.source.clone()
    }
}

impl FromRef<AppState> for SharedStockList {
    fn from_ref(app_state: &AppState) -> SharedStockList {
        app_state.stocks.clone()
    }
}

/// Build the HTTP router. Per-IP limiting requires serving with connect info.
pub fn router(
    app_state: AppState,
    compare_limit: Option<CompareLimit>,
    static_dir: Option<&str>,
) -> Router {
    let governor_conf = compare_limit.and_then(|limit| {
        GovernorConfigBuilder::default()
            .per_second(limit.per_second)
            .burst_size(limit.burst_size)
            .finish()
    });

    let compare_route = match governor_conf {
        Some(conf) => {
            tracing::info!(?compare_limit, "Rate limiting /api/compare per client IP");
            post(api::compare_handler).layer(GovernorLayer::new(Arc::new(conf)))
        }
        None => post(api::compare_handler),
    };

    let mut app = Router::new()
        .route("/api/stocks", get(api::get_stocks_handler))
        .route("/api/compare", compare_route)
        .route("/health", get(api::health_handler));

    if let Some(dir) = static_dir {
        tracing::info!(%dir, "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
