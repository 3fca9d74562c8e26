use crate::data_structures::RawSeries;
use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Fetch-by-symbol collaborator used by the HTTP layer.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch_series(&self, symbol: &str) -> Result<RawSeries, ProviderError>;
}

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub interval: String,
    pub output_size: String,
    pub rate_limit_per_minute: u32,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: "60min".to_string(),
            output_size: "compact".to_string(),
            rate_limit_per_minute: 5,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

pub struct AlphaVantageClient {
    client: Client,
    settings: ClientSettings,
    request_timestamps: Mutex<Vec<Instant>>,
}

impl AlphaVantageClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .gzip(true)
            .build()?;

        Ok(AlphaVantageClient {
            client,
            settings,
            request_timestamps: Mutex::new(Vec::new()),
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Key of the series object in the intraday payload, e.g. `Time Series (60min)`.
    pub fn series_key(&self) -> String {
        format!("Time Series ({})", self.settings.interval)
    }

    async fn enforce_rate_limit(&self) {
        let mut timestamps = self.request_timestamps.lock().await;
        let now = Instant::now();

        timestamps.retain(|&t| now.duration_since(t) < RATE_WINDOW);

        if self.settings.rate_limit_per_minute > 0
            && timestamps.len() >= self.settings.rate_limit_per_minute as usize
        {
            if let Some(&oldest) = timestamps.first() {
                let wait = RATE_WINDOW.saturating_sub(now.duration_since(oldest));
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit window");
                    sleep(wait + Duration::from_millis(100)).await;
                }
            }
            let now = Instant::now();
            timestamps.retain(|&t| now.duration_since(t) < RATE_WINDOW);
        }

        timestamps.push(Instant::now());
    }

    async fn make_request(&self, symbol: &str) -> Result<Value, ProviderError> {
        let params = [
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", self.settings.interval.as_str()),
            ("outputsize", self.settings.output_size.as_str()),
            ("apikey", self.settings.api_key.as_str()),
        ];

        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = Duration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>());
                let delay = delay.min(Duration::from_secs(60));
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                sleep(delay).await;
            }

            self.enforce_rate_limit().await;

            let response = self
                .client
                .get(&self.settings.base_url)
                .header("Accept", "application/json")
                .query(&params)
                .send()
                .await;

            let error = match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json::<Value>().await?);
                    }
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Err(ProviderError::Status(status));
                    }
                    warn!(attempt, %status, "Retryable status from provider");
                    ProviderError::Status(status)
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Request to provider failed");
                    ProviderError::Http(e)
                }
            };

            if attempt >= self.settings.max_retries {
                return Err(error);
            }
            attempt += 1;
        }
    }

    /// Fetch the intraday series for `symbol`.
    #[instrument(skip(self))]
    pub async fn get_intraday(&self, symbol: &str) -> Result<RawSeries, ProviderError> {
        let payload = self.make_request(symbol).await?;
        let series = parse_intraday_payload(payload, &self.series_key())?;
        info!(points = series.len(), "Fetched intraday series");
        Ok(series)
    }
}

#[async_trait]
impl SeriesSource for AlphaVantageClient {
    async fn fetch_series(&self, symbol: &str) -> Result<RawSeries, ProviderError> {
        self.get_intraday(symbol).await
    }
}

/// Interpret an intraday response body.
pub fn parse_intraday_payload(mut payload: Value, series_key: &str) -> Result<RawSeries, ProviderError> {
    if let Some(message) = payload.get("Error Message") {
        return Err(ProviderError::Provider(text_of(message)));
    }

    for notice in ["Note", "Information"] {
        if let Some(message) = payload.get(notice) {
            return Err(ProviderError::RateLimited(text_of(message)));
        }
    }

    let series = payload
        .get_mut(series_key)
        .map(Value::take)
        .ok_or_else(|| ProviderError::UnexpectedSchema(format!("missing key {series_key:?}")))?;

    let series: RawSeries =
        serde_json::from_value(series).map_err(|e| ProviderError::UnexpectedSchema(e.to_string()))?;
    if series.is_empty() {
        return Err(ProviderError::UnexpectedSchema(format!("{series_key:?} has no records")));
    }
    Ok(series)
}

fn text_of(value: &Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}
