use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// --- Raw Provider Data ---

/// One period of a provider time series. Values arrive as text and are parsed by the extractor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(rename = "4. close", alias = "close", default)]
    pub close: Option<String>,
    #[serde(rename = "5. volume", alias = "volume", default)]
    pub volume: Option<String>,
}

impl RawBar {
    pub fn new(close: impl Into<String>, volume: impl Into<String>) -> Self {
        Self {
            close: Some(close.into()),
            volume: Some(volume.into()),
        }
    }
}

/// Timestamp label -> bar. Labels must be fixed-width and zero-padded so that
/// lexicographic order matches chronological order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSeries(pub BTreeMap<String, RawBar>);

impl RawSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timestamp: impl Into<String>, bar: RawBar) {
        self.0.insert(timestamp.into(), bar);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries ordered most recent first.
    pub fn iter_desc(&self) -> impl Iterator<Item = (&String, &RawBar)> {
        self.0.iter().rev()
    }
}

impl<K: Into<String>> FromIterator<(K, RawBar)> for RawSeries {
    fn from_iter<I: IntoIterator<Item = (K, RawBar)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// --- Derived Data ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub avg_price: f64,
    pub volatility: f64,
    pub latest_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub avg_volume: f64,
    pub daily_return: f64,
    // Display window, most recent first
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub volumes: Vec<u64>,
}

/// Which operand won a single factor. There is no tie at this level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "stock1")]
    Stock1,
    #[serde(rename = "stock2")]
    Stock2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "stock1")]
    Stock1,
    #[serde(rename = "stock2")]
    Stock2,
    #[serde(rename = "tie")]
    Tie,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFactor {
    pub factor: String,
    pub winner: Side,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Outcome,
    pub score1: u32,
    pub score2: u32,
    pub conclusion: String,
    pub factors: Vec<ComparisonFactor>,
}

// --- Popular Stocks ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub symbol: String,
    pub name: String,
}

pub type SharedStockList = Arc<Vec<StockInfo>>;
