use crate::data_structures::{FeatureSummary, RawSeries};
use crate::error::ExtractionError;

/// Number of most recent periods kept for charting.
pub const DISPLAY_WINDOW: usize = 30;

/// Summarize one symbol's raw series.
pub fn extract(raw: &RawSeries) -> Result<FeatureSummary, ExtractionError> {
    if raw.is_empty() {
        return Err(ExtractionError::EmptySeries);
    }

    let mut dates = Vec::with_capacity(raw.len());
    let mut prices = Vec::with_capacity(raw.len());
    let mut volumes = Vec::with_capacity(raw.len());

    for (timestamp, bar) in raw.iter_desc() {
        let close = bar.close.as_deref().ok_or_else(|| ExtractionError::MissingField {
            timestamp: timestamp.clone(),
            field: "close",
        })?;
        let volume = bar.volume.as_deref().ok_or_else(|| ExtractionError::MissingField {
            timestamp: timestamp.clone(),
            field: "volume",
        })?;

        dates.push(timestamp.clone());
        prices.push(parse_close(timestamp, close)?);
        volumes.push(parse_volume(timestamp, volume)?);
    }

    let latest = prices[0];
    let oldest = prices[prices.len() - 1];

    // Closes are positive, so `oldest` is a safe divisor
    let (price_change, price_change_percent) = if prices.len() > 1 {
        let change = latest - oldest;
        (change, change / oldest * 100.0)
    } else {
        (0.0, 0.0)
    };

    // Index 0 is most recent minus the period before it
    let diffs: Vec<f64> = prices.windows(2).map(|w| w[0] - w[1]).collect();
    let volume_values: Vec<f64> = volumes.iter().map(|&v| v as f64).collect();
    let avg_price = mean(&prices);
    let volatility = population_std(&prices);
    let avg_volume = mean(&volume_values);
    let daily_return = mean(&diffs);

    // Huge closes can still overflow the sums
    for (field, value) in [
        ("avg_price", avg_price),
        ("volatility", volatility),
        ("price_change", price_change),
        ("price_change_percent", price_change_percent),
        ("avg_volume", avg_volume),
        ("daily_return", daily_return),
    ] {
        if !value.is_finite() {
            return Err(ExtractionError::NonFinite { field });
        }
    }

    dates.truncate(DISPLAY_WINDOW);
    prices.truncate(DISPLAY_WINDOW);
    volumes.truncate(DISPLAY_WINDOW);

    Ok(FeatureSummary {
        avg_price,
        volatility,
        latest_price: latest,
        price_change,
        price_change_percent,
        avg_volume,
        daily_return,
        dates,
        prices,
        volumes,
    })
}

fn parse_close(timestamp: &str, value: &str) -> Result<f64, ExtractionError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| ExtractionError::InvalidNumber {
            timestamp: timestamp.to_string(),
            field: "close",
            value: value.to_string(),
        })
}

fn parse_volume(timestamp: &str, value: &str) -> Result<u64, ExtractionError> {
    value.trim().parse::<u64>().map_err(|_| ExtractionError::InvalidNumber {
        timestamp: timestamp.to_string(),
        field: "volume",
        value: value.to_string(),
    })
}

/// Mean of `values`, 0 for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
