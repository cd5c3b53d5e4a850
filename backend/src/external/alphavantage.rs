use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PriceBar;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, PriceProviderError> {
        let api_key = std::env::var("ALPHAVANTAGE_API_KEY")
            .map_err(|_| PriceProviderError::BadResponse("ALPHAVANTAGE_API_KEY not set".into()))?;

        Ok(Self::new(api_key))
    }
}

#[derive(Debug, Deserialize)]
struct AvDailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, AvDailyBar>>,

    // When rate-limited Alpha Vantage returns:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Information")]
    information: Option<String>,

    // When invalid:
    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

fn parse_field(name: &str, raw: &str) -> Result<f64, PriceProviderError> {
    raw.parse::<f64>()
        .map_err(|e| PriceProviderError::Parse(format!("{}: {}", name, e)))
}

/// Keeps the bars with `start <= date < end`.
fn parse_daily(
    body: AvDailyResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, PriceProviderError> {
    if body.note.is_some() || body.information.is_some() {
        return Err(PriceProviderError::RateLimited);
    }

    if let Some(msg) = body.error_message {
        return Err(PriceProviderError::BadResponse(msg));
    }

    let series = body
        .time_series
        .ok_or_else(|| PriceProviderError::BadResponse("missing time series".into()))?;

    // series is keyed by "YYYY-MM-DD" strings; BTreeMap iterates ascending
    let mut out = Vec::new();
    for (date_str, bar) in series {
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        if date < start || date >= end {
            continue;
        }

        out.push(PriceBar {
            date,
            open: parse_field("open", &bar.open)?,
            high: parse_field("high", &bar.high)?,
            low: parse_field("low", &bar.low)?,
            close: parse_field("close", &bar.close)?,
            volume: bar
                .volume
                .parse::<u64>()
                .map_err(|e| PriceProviderError::Parse(format!("volume: {}", e)))?,
        });
    }

    Ok(out)
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn name(&self) -> &'static str {
        "alphavantage"
    }

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        // No date-range parameters on this endpoint; fetch the full history and filter.
        let url = "https://www.alphavantage.co/query";

        let resp = self
            .client
            .get(url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", ticker),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let body = resp
            .json::<AvDailyResponse>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_daily(body, start, end)
    }
}
