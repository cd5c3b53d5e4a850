use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PriceBar;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

pub struct TwelveDataProvider {
    client: reqwest::Client,
    api_key: String,
}

impl TwelveDataProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, PriceProviderError> {
        let api_key = std::env::var("TWELVEDATA_API_KEY")
            .map_err(|_| PriceProviderError::BadResponse("TWELVEDATA_API_KEY not set".into()))?;

        Ok(Self::new(api_key))
    }
}

#[derive(Debug, Deserialize)]
struct TwelveDataTimeSeriesResponse {
    values: Option<Vec<TwelveDataValue>>,
    status: String,

    // Error handling
    message: Option<String>,
    code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TwelveDataValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: Option<String>,
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, PriceProviderError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| PriceProviderError::Parse(format!("{} '{}': {}", field, raw, e)))
}

fn parse_time_series(body: TwelveDataTimeSeriesResponse) -> Result<Vec<PriceBar>, PriceProviderError> {
    if body.status != "ok" {
        let msg = body
            .message
            .unwrap_or_else(|| format!("API returned status: {}", body.status));

        if body.code == Some(429) || msg.contains("API rate limit") || msg.contains("credits") {
            return Err(PriceProviderError::RateLimited);
        }
        // A valid symbol with an empty date window is reported as an error by Twelve Data
        if msg.contains("No data is available") {
            return Ok(Vec::new());
        }
        if body.code == Some(404) {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(msg));
    }

    let values = body.values.unwrap_or_default();

    values
        .into_iter()
        .map(|v| -> Result<PriceBar, PriceProviderError> {
            // "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD"
            let date_part = v.datetime.split(' ').next().unwrap_or(&v.datetime);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

            let volume = match v.volume.as_deref() {
                Some(raw) if !raw.is_empty() => parse_number::<f64>("volume", raw)?.max(0.0) as u64,
                _ => 0,
            };

            Ok(PriceBar {
                date,
                open: parse_number("open", &v.open)?,
                high: parse_number("high", &v.high)?,
                low: parse_number("low", &v.low)?,
                close: parse_number("close", &v.close)?,
                volume,
            })
        })
        .collect()
}

#[async_trait]
impl PriceProvider for TwelveDataProvider {
    fn name(&self) -> &'static str {
        "twelvedata"
    }

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        let url = "https://api.twelvedata.com/time_series";

        let start_date = start.to_string();
        // end_date is exclusive for daily bars
        let end_date = end.to_string();

        let resp = self
            .client
            .get(url)
            .query(&[
                ("symbol", ticker),
                ("interval", "1day"),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("order", "ASC"),
                ("outputsize", "5000"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }

        let body: TwelveDataTimeSeriesResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_time_series(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<PriceBar>, PriceProviderError> {
        parse_time_series(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_parse_values() {
        let json = r#"{
            "meta": { "symbol": "AAPL", "interval": "1day" },
            "values": [
                { "datetime": "2023-01-03", "open": "130.28", "high": "130.9",
                  "low": "124.17", "close": "125.07", "volume": "112117500" },
                { "datetime": "2023-01-04 00:00:00", "open": "126.89", "high": "128.66",
                  "low": "125.08", "close": "126.36", "volume": "89113600" }
            ],
            "status": "ok"
        }"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2023, 1, 4).unwrap());
        assert_eq!(bars[1].close, 126.36);
        assert_eq!(bars[0].volume, 112_117_500);
    }

    #[test]
    fn test_rate_limit_message() {
        let json = r#"{ "status": "error", "code": 429,
                        "message": "You have run out of API credits for the current minute." }"#;
        assert!(matches!(parse(json), Err(PriceProviderError::RateLimited)));
    }

    #[test]
    fn test_no_data_is_empty() {
        let json = r#"{ "status": "error", "code": 400,
                        "message": "No data is available on the specified dates. Try setting different start/end dates." }"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_symbol_is_error() {
        let json = r#"{ "status": "error", "code": 404,
                        "message": "**symbol** not found: ZZZZZ. Please specify it correctly." }"#;
        assert!(matches!(parse(json), Err(PriceProviderError::NotFound)));
    }
}
