use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::PriceBar;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,
}

/// A source of daily OHLCV bars.
///
/// `end` is exclusive: callers wanting an inclusive range pass the day after
/// their last date. Implementations return bars in any order; normalization
/// (sorting, deduplication) happens in `market_data_service`. An empty `Vec`
/// means the call succeeded but the provider had no bars for the range.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError>;
}
