use crate::comparator;
use crate::data_structures::{FeatureSummary, SharedStockList, StockInfo, Verdict};
use crate::error::{ApiError, ProviderError};
use crate::features;
use crate::server::{AppState, SharedSource};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Default, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub stock1: Option<String>,
    #[serde(default)]
    pub stock2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolFeatures {
    pub symbol: String,
    pub features: FeatureSummary,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub stock1: SymbolFeatures,
    pub stock2: SymbolFeatures,
    pub comparison: Verdict,
}

#[derive(Debug, Serialize)]
pub struct StocksResponse<'a> {
    pub success: bool,
    pub stocks: &'a [StockInfo],
}

/// Trimmed, upper-cased symbol; `None` when blank.
pub fn normalize_symbol(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

/// GET /api/stocks - symbols for the UI dropdowns
#[instrument(skip(stocks))]
pub async fn get_stocks_handler(State(stocks): State<SharedStockList>) -> impl IntoResponse {
    debug!(count = stocks.len(), "Returning popular stocks");
    Json(StocksResponse {
        success: true,
        stocks: &stocks,
    })
    .into_response()
}

/// POST /api/compare - fetch, summarize and score two symbols
#[instrument(skip_all)]
pub async fn compare_handler(
    State(source): State<SharedSource>,
    Json(payload): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, ApiError> {
    let (Some(stock1), Some(stock2)) = (
        normalize_symbol(payload.stock1.as_deref()),
        normalize_symbol(payload.stock2.as_deref()),
    ) else {
        warn!(?payload, "Compare request without both symbols");
        return Err(ApiError::MissingSymbols);
    };

    debug!(%stock1, %stock2, "Fetching series for comparison");
    let (raw1, raw2) = if stock1 == stock2 {
        let raw = source
            .fetch_series(&stock1)
            .await
            .map_err(|e| fetch_failed(&stock1, e))?;
        (raw.clone(), raw)
    } else {
        let (raw1, raw2) = futures::join!(source.fetch_series(&stock1), source.fetch_series(&stock2));
        (
            raw1.map_err(|e| fetch_failed(&stock1, e))?,
            raw2.map_err(|e| fetch_failed(&stock2, e))?,
        )
    };

    let features1 = features::extract(&raw1).map_err(|e| {
        error!(symbol = %stock1, error = %e, "Error extracting features");
        ApiError::Processing
    })?;
    let features2 = features::extract(&raw2).map_err(|e| {
        error!(symbol = %stock2, error = %e, "Error extracting features");
        ApiError::Processing
    })?;

    let comparison = comparator::compare(&features1, &features2);
    info!(
        %stock1,
        %stock2,
        winner = ?comparison.winner,
        score1 = comparison.score1,
        score2 = comparison.score2,
        "Comparison complete"
    );

    Ok(Json(CompareResponse {
        success: true,
        stock1: SymbolFeatures {
            symbol: stock1,
            features: features1,
        },
        stock2: SymbolFeatures {
            symbol: stock2,
            features: features2,
        },
        comparison,
    }))
}

fn fetch_failed(symbol: &str, error: ProviderError) -> ApiError {
    warn!(%symbol, %error, "Could not fetch series");
    ApiError::Fetch {
        symbol: symbol.to_string(),
    }
}

/// GET /health
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().as_secs();
    debug!(uptime_secs, "Health check");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "environment": &*state.environment,
            "uptime_secs": uptime_secs,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
