use crate::alpha_vantage::{ClientSettings, DEFAULT_BASE_URL};
use crate::constants::POPULAR_STOCKS;
use crate::data_structures::{SharedStockList, StockInfo};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

// Per-IP limit on the compare endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareLimit {
    pub per_second: u64,
    pub burst_size: u32,
}

impl CompareLimit {
    // Zero in either field disables limiting
    fn from_parts(per_second: u64, burst_size: u32) -> Option<Self> {
        (per_second > 0 && burst_size > 0).then_some(Self { per_second, burst_size })
    }
}

// YAML-serializable configuration structure
#[derive(Serialize, Deserialize, Debug)]
pub struct ConfigYaml {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_output_size")]
    pub output_size: String,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    pub popular_stocks_file: Option<String>,
    pub static_dir: Option<String>,
    #[serde(default = "default_compare_per_second")]
    pub compare_per_second: u64,
    #[serde(default = "default_compare_burst")]
    pub compare_burst: u32,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_interval() -> String {
    "60min".to_string()
}
fn default_output_size() -> String {
    "compact".to_string()
}
fn default_rate_limit() -> u32 {
    5 // free tier
}
fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    3
}
fn default_cache_ttl() -> u64 {
    60
}
fn default_compare_per_second() -> u64 {
    2
}
fn default_compare_burst() -> u32 {
    5
}
fn default_environment() -> String {
    "development".to_string()
}
fn default_port() -> u16 {
    5000
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub cache_ttl: Duration,
    pub popular_stocks_file: Option<String>,
    pub static_dir: Option<String>,
    pub compare_limit: Option<CompareLimit>,
    pub environment: String,
    pub port: u16,
}

impl From<ConfigYaml> for AppConfig {
    fn from(yaml: ConfigYaml) -> Self {
        Self {
            client: ClientSettings {
                api_key: yaml.api_key,
                base_url: yaml.base_url,
                interval: yaml.interval,
                output_size: yaml.output_size,
                rate_limit_per_minute: yaml.rate_limit_per_minute,
                request_timeout: Duration::from_secs(yaml.request_timeout_secs),
                max_retries: yaml.max_retries,
            },
            cache_ttl: Duration::from_secs(yaml.cache_ttl_secs),
            popular_stocks_file: yaml.popular_stocks_file,
            static_dir: yaml.static_dir,
            compare_limit: CompareLimit::from_parts(yaml.compare_per_second, yaml.compare_burst),
            environment: yaml.environment,
            port: yaml.port,
        }
    }
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Self::from_env()
        }
    }

    pub fn from_yaml(file_path: &str) -> Result<Self, ConfigError> {
        let yaml_content = fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml_content, file_path)
    }

    pub fn from_yaml_str(yaml_content: &str, origin: &str) -> Result<Self, ConfigError> {
        let yaml_config: ConfigYaml =
            serde_yaml::from_str(yaml_content).map_err(|e| ConfigError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        if yaml_config.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }
        Ok(yaml_config.into())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("ALPHA_VANTAGE_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("ALPHA_VANTAGE_API_KEY"))?;

        let compare_per_second = parse_var(&var, "COMPARE_PER_SECOND", default_compare_per_second())?;
        let compare_burst = parse_var(&var, "COMPARE_BURST", default_compare_burst())?;

        Ok(Self {
            client: ClientSettings {
                api_key,
                base_url: var("ALPHA_VANTAGE_BASE_URL").unwrap_or_else(default_base_url),
                interval: var("SERIES_INTERVAL").unwrap_or_else(default_interval),
                output_size: var("OUTPUT_SIZE").unwrap_or_else(default_output_size),
                rate_limit_per_minute: parse_var(&var, "RATE_LIMIT_PER_MINUTE", default_rate_limit())?,
                request_timeout: Duration::from_secs(parse_var(&var, "REQUEST_TIMEOUT_SECS", default_timeout())?),
                max_retries: parse_var(&var, "MAX_RETRIES", default_retries())?,
            },
            cache_ttl: Duration::from_secs(parse_var(&var, "CACHE_TTL_SECS", default_cache_ttl())?),
            popular_stocks_file: var("POPULAR_STOCKS_FILE"),
            static_dir: var("STATIC_DIR"),
            compare_limit: CompareLimit::from_parts(compare_per_second, compare_burst),
            environment: var("ENVIRONMENT").unwrap_or_else(default_environment),
            port: parse_var(&var, "PORT", default_port())?,
        })
    }
}

fn parse_var<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Load the dropdown symbol list from a JSON file, or fall back to the built-in list.
pub fn load_popular_stocks(path: Option<&str>) -> Result<SharedStockList, ConfigError> {
    let Some(path) = path else {
        return Ok(Arc::new(default_popular_stocks()));
    };

    tracing::info!("Loading popular stocks from: {}", path);

    let json_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let stocks: Vec<StockInfo> =
        serde_json::from_str(&json_content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    tracing::info!("Successfully loaded {} popular stocks", stocks.len());
    Ok(Arc::new(stocks))
}

pub fn default_popular_stocks() -> Vec<StockInfo> {
    POPULAR_STOCKS
        .iter()
        .map(|(symbol, name)| StockInfo {
            symbol: symbol.to_string(),
            name: name.to_string(),
        })
        .collect()
}
