use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PriceBar;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use serde::Deserialize;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance provider - free chart API, no API key required.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self::with_base_url(CHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; StockDashboard/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: YahooMeta,
    // Absent when the range holds no trading days.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<PriceBar>, PriceProviderError> {
    if let Some(error) = body.chart.error {
        if error.code.as_deref() == Some("Not Found")
            || error.description.contains("No data found")
        {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| PriceProviderError::BadResponse("No results in response".into()))?;

    if result.timestamp.is_empty() {
        return Ok(Vec::new());
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| PriceProviderError::BadResponse("No quote data in response".into()))?;

    if quote.close.len() != result.timestamp.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let offset = result.meta.gmtoffset;
    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            // Skip null rows (halts, holidays reported with no trade)
            let close = field(&quote.close, i)?;
            let open = field(&quote.open, i).unwrap_or(close);
            let high = field(&quote.high, i).unwrap_or(close);
            let low = field(&quote.low, i).unwrap_or(close);
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

            // Bar timestamps are the exchange open in UTC; shift to exchange local time for the date.
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)?.date_naive();

            Some(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect();

    Ok(bars)
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        let url = format!("{}/{}", self.base_url, ticker);
        // Exchanges east of UTC open before UTC midnight, so the start bar can
        // carry the previous day's timestamp. Ask one day early and clip below.
        let period1 = unix_midnight(start - ChronoDuration::days(1));

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", unix_midnight(end).to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }

        // Yahoo reports most failures in the body's chart.error, sometimes with a 4xx status.
        let body: YahooChartResponse = resp.json().await.map_err(|e| {
            if status.is_success() {
                PriceProviderError::Parse(e.to_string())
            } else {
                PriceProviderError::BadResponse(format!("HTTP {}", status))
            }
        })?;

        let mut bars = parse_chart(body)?;
        bars.retain(|b| b.date >= start && b.date < end);
        Ok(bars)
    }
}
