//! Integration tests for the HTTP surface, driven through the router with a stub source.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use stock_compare::alpha_vantage::SeriesSource;
use stock_compare::config::{CompareLimit, default_popular_stocks};
use stock_compare::data_structures::{RawBar, RawSeries};
use stock_compare::error::ProviderError;
use stock_compare::server::{AppState, router};
use tokio::net::TcpListener;
use tower::ServiceExt;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Serves canned series; unknown symbols fail like a provider error payload.
struct StubSource {
    series: HashMap<String, RawSeries>,
    calls: AtomicUsize,
}

#[async_trait]
impl SeriesSource for StubSource {
    async fn fetch_series(&self, symbol: &str) -> Result<RawSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::Provider("Invalid API call.".to_string()))
    }
}

fn series(rows: &[(&str, &str, &str)]) -> RawSeries {
    rows.iter()
        .map(|(ts, close, volume)| (*ts, RawBar::new(*close, *volume)))
        .collect()
}

fn stub_source() -> Arc<StubSource> {
    let mut canned = HashMap::new();
    // Steady riser with heavy volume
    canned.insert(
        "AAPL".to_string(),
        series(&[
            ("2024-01-02 12:00:00", "103", "5000"),
            ("2024-01-02 11:00:00", "102", "5000"),
            ("2024-01-02 10:00:00", "101", "5000"),
            ("2024-01-02 09:00:00", "100", "5000"),
        ]),
    );
    // Choppy decliner with light volume
    canned.insert(
        "MSFT".to_string(),
        series(&[
            ("2024-01-02 12:00:00", "90", "100"),
            ("2024-01-02 11:00:00", "110", "100"),
            ("2024-01-02 10:00:00", "80", "100"),
            ("2024-01-02 09:00:00", "100", "100"),
        ]),
    );
    canned.insert("EMPTY".to_string(), RawSeries::new());
    canned.insert(
        "BROKEN".to_string(),
        series(&[("2024-01-02 12:00:00", "n/a", "100")]),
    );

    Arc::new(StubSource {
        series: canned,
        calls: AtomicUsize::new(0),
    })
}

fn test_state(source: Arc<StubSource>) -> AppState {
    AppState::new(source, Arc::new(default_popular_stocks()), "test")
}

fn create_test_app() -> Router {
    router(test_state(stub_source()), None, None)
}

async fn post_compare(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/compare")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// GET endpoints
// ============================================================================

#[tokio::test]
async fn test_stocks_endpoint() {
    let (status, json) = get_json(create_test_app(), "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let stocks = json["stocks"].as_array().unwrap();
    assert_eq!(stocks.len(), 20);
    assert_eq!(stocks[0], json!({"symbol": "AAPL", "name": "Apple Inc."}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get_json(create_test_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["environment"], "test");
    assert!(json["timestamp"].is_string());
}

// ============================================================================
// POST /api/compare
// ============================================================================

#[tokio::test]
async fn test_compare_success() {
    let (status, json) =
        post_compare(create_test_app(), json!({"stock1": " aapl ", "stock2": "msft"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["stock1"]["symbol"], "AAPL");
    assert_eq!(json["stock2"]["symbol"], "MSFT");

    let features = &json["stock1"]["features"];
    assert_eq!(features["latest_price"], 103.0);
    assert_eq!(features["price_change"], 3.0);
    assert_eq!(features["daily_return"], 1.0);
    assert_eq!(features["prices"], json!([103.0, 102.0, 101.0, 100.0]));
    assert_eq!(features["dates"][0], "2024-01-02 12:00:00");
    for field in [
        "avg_price",
        "volatility",
        "price_change_percent",
        "avg_volume",
        "volumes",
    ] {
        assert!(features.get(field).is_some(), "missing {field}");
    }

    let comparison = &json["comparison"];
    assert_eq!(comparison["winner"], "stock1");
    assert_eq!(comparison["score1"], 4);
    assert_eq!(comparison["score2"], 0);
    assert_eq!(comparison["factors"].as_array().unwrap().len(), 4);
    assert!(comparison["conclusion"].as_str().unwrap().contains("4/4"));
}

#[tokio::test]
async fn test_compare_same_symbol_favors_second() {
    let (status, json) =
        post_compare(create_test_app(), json!({"stock1": "AAPL", "stock2": "AAPL"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["comparison"]["winner"], "stock2");
    assert_eq!(json["comparison"]["score2"], 4);
}

#[tokio::test]
async fn test_compare_same_symbol_fetches_once() {
    let source = stub_source();
    let app = router(test_state(source.clone()), None, None);

    let (status, json) = post_compare(app, json!({"stock1": "msft", "stock2": " MSFT"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stock1"]["features"], json["stock2"]["features"]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_compare_distinct_symbols_fetch_each() {
    let source = stub_source();
    let app = router(test_state(source.clone()), None, None);

    let (status, _) = post_compare(app, json!({"stock1": "AAPL", "stock2": "MSFT"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_compare_missing_symbol() {
    let (status, json) = post_compare(create_test_app(), json!({"stock1": "AAPL"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Please provide both stock symbols.");

    let (status, _) =
        post_compare(create_test_app(), json!({"stock1": "  ", "stock2": "MSFT"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_fetch_failure_names_symbol() {
    let (status, json) =
        post_compare(create_test_app(), json!({"stock1": "AAPL", "stock2": "zzzz"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Could not fetch data for ZZZZ. Please check the symbol and try again."
    );
}

#[tokio::test]
async fn test_compare_reports_first_symbol_failure_first() {
    let (_, json) =
        post_compare(create_test_app(), json!({"stock1": "XXXX", "stock2": "YYYY"})).await;

    assert_eq!(
        json["error"],
        "Could not fetch data for XXXX. Please check the symbol and try again."
    );
}

#[tokio::test]
async fn test_compare_extraction_failure_is_generic() {
    for bad in ["EMPTY", "BROKEN"] {
        let (status, json) =
            post_compare(create_test_app(), json!({"stock1": "AAPL", "stock2": bad})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Error processing stock data. Please try again.");
    }
}

// ============================================================================
// Rate limiting and static files
// ============================================================================

#[tokio::test]
async fn test_compare_is_rate_limited_per_client() {
    let limit = CompareLimit {
        per_second: 60,
        burst_size: 1,
    };
    let app = router(test_state(stub_source()), Some(limit), None);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    let client = reqwest::Client::new();
    let compare_url = format!("http://{addr}/api/compare");
    let body = json!({"stock1": "AAPL", "stock2": "MSFT"});

    let first = client.post(&compare_url).json(&body).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = client.post(&compare_url).json(&body).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Other routes are not limited
    let health = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_fallback_serves_index() {
    let dir = std::env::temp_dir().join(format!("stock-compare-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>Stock Compare</h1>").unwrap();

    let app = router(test_state(stub_source()), None, dir.to_str());
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>Stock Compare</h1>");

    // API routes take precedence over the fallback
    let (status, json) = get_json(app, "/api/stocks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    std::fs::remove_dir_all(&dir).unwrap();
}
