use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures fetching a series from the market-data provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Unexpected response schema: {0}")]
    UnexpectedSchema(String),
}

/// Failures turning a raw series into a feature summary.
#[derive(Error, Debug, PartialEq)]
pub enum ExtractionError {
    #[error("series is empty")]
    EmptySeries,

    #[error("record {timestamp} is missing field {field}")]
    MissingField {
        timestamp: String,
        field: &'static str,
    },

    #[error("record {timestamp} has non-numeric {field}: {value:?}")]
    InvalidNumber {
        timestamp: String,
        field: &'static str,
        value: String,
    },

    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Errors returned to HTTP clients. Details of extraction failures stay in the logs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Please provide both stock symbols.")]
    MissingSymbols,

    #[error("Could not fetch data for {symbol}. Please check the symbol and try again.")]
    Fetch { symbol: String },

    #[error("Error processing stock data. Please try again.")]
    Processing,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingSymbols | ApiError::Fetch { .. } => StatusCode::BAD_REQUEST,
            ApiError::Processing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
