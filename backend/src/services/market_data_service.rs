use chrono::{Duration as ChronoDuration, NaiveDate};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{normalize_ticker, PriceBar, PriceSeries};

/// Fetches daily bars for `ticker` covering `[start, end]` inclusive.
///
/// One best-effort provider call: no retries, no caching. A provider failure
/// becomes `AppError::FetchFailed` naming the ticker; an empty result (including
/// an inverted range, which never reaches the provider) becomes `AppError::NoData`.
pub async fn fetch_series(
    provider: &dyn PriceProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, AppError> {
    let ticker = normalize_ticker(ticker)?;

    if start > end {
        warn!("Inverted date range for {}: {} > {}", ticker, start, end);
        return Err(AppError::NoData);
    }

    // Providers treat the end bound as exclusive.
    let end_exclusive = end + ChronoDuration::days(1);

    info!(
        "Fetching {} daily bars from {} ({} to {})",
        ticker,
        provider.name(),
        start,
        end
    );

    let bars = provider
        .fetch_daily_bars(&ticker, start, end_exclusive)
        .await
        .map_err(|e| {
            error!("✗ Failed to fetch price data for {}: {}", ticker, e);
            AppError::fetch_failed(&ticker, e)
        })?;

    let bars = normalize_bars(bars, start, end);

    if bars.is_empty() {
        warn!("No data returned for {} between {} and {}", ticker, start, end);
        return Err(AppError::NoData);
    }

    let series = PriceSeries::new(ticker, bars);
    info!("✓ Fetched {} bars for {}", series.len(), series.ticker);
    Ok(series)
}

/// Sorts ascending, keeps only dates inside `[start, end]`, and collapses
/// duplicate dates to the last bar reported for that date.
pub fn normalize_bars(mut bars: Vec<PriceBar>, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    bars.retain(|b| b.date >= start && b.date <= end && b.close.is_finite());
    // Stable sort keeps provider order within a date, so the later bar wins below.
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
