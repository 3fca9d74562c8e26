use crate::alpha_vantage::SeriesSource;
use crate::data_structures::RawSeries;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry {
    series: RawSeries,
    stored_at: Instant,
}

/// Keeps successful fetches in memory for `ttl`. Failures are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<S: SeriesSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    async fn lookup(&self, key: &str) -> Option<RawSeries> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) => {
                let age = entry.stored_at.elapsed();
                if age < self.ttl {
                    debug!(symbol = key, age_secs = age.as_secs(), "Cache hit");
                    Some(entry.series.clone())
                } else {
                    debug!(symbol = key, age_secs = age.as_secs(), ttl_secs = self.ttl.as_secs(), "Cache expired");
                    entries.remove(key);
                    None
                }
            }
            None => {
                debug!(symbol = key, "Cache miss");
                None
            }
        }
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let removed_count = before - entries.len();
        if removed_count > 0 {
            debug!(removed_count, "Purged expired cache entries");
        }
        removed_count
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl<S: SeriesSource> SeriesSource for CachedSource<S> {
    async fn fetch_series(&self, symbol: &str) -> Result<RawSeries, ProviderError> {
        let key = Self::cache_key(symbol);
        if let Some(series) = self.lookup(&key).await {
            return Ok(series);
        }

        let series = self.inner.fetch_series(symbol).await?;
        debug!(symbol = %key, points = series.len(), "Caching series");
        self.entries.lock().await.insert(
            key,
            CacheEntry {
                series: series.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(series)
    }
}
