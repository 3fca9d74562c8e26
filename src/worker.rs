use crate::alpha_vantage::SeriesSource;
use crate::utils::CachedSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Periodically evict expired series so symbols that are never requested again do not linger.
#[instrument(skip(cache))]
pub async fn run_cache_janitor<S: SeriesSource + 'static>(cache: Arc<CachedSource<S>>, interval: Duration) {
    info!("Starting cache janitor");
    let mut ticker = tokio::time::interval(interval);
    let mut iteration_count = 0u64;

    loop {
        ticker.tick().await;
        iteration_count += 1;

        let removed = cache.purge_expired().await;
        let remaining = cache.len().await;
        debug!(iteration = iteration_count, removed, remaining, "Cache janitor pass complete");
    }
}
