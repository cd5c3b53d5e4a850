use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Figure, IndicatorRow};

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_SMA_WINDOW: usize = 20;
pub const DEFAULT_EMA_WINDOW: usize = 50;
pub const DEFAULT_RSI_WINDOW: usize = 14;
pub const PREVIEW_ROWS: usize = 20;

pub const SMA_WINDOW_RANGE: (usize, usize) = (2, 200);
pub const EMA_WINDOW_RANGE: (usize, usize) = (2, 200);
pub const RSI_WINDOW_RANGE: (usize, usize) = (5, 50);

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// Raw form values as they arrive in the query string.
///
/// Every field is optional; missing fields fall back to the form defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub sma: Option<String>,
    pub ema: Option<String>,
    pub rsi: Option<String>,
}

/// The five validated form inputs for one dashboard run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardInputs {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sma_window: usize,
    pub ema_window: usize,
    pub rsi_window: usize,
}

impl Default for DashboardInputs {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start: default_start_date(),
            end: Utc::now().date_naive(),
            sma_window: DEFAULT_SMA_WINDOW,
            ema_window: DEFAULT_EMA_WINDOW,
            rsi_window: DEFAULT_RSI_WINDOW,
        }
    }
}

impl TryFrom<DashboardQuery> for DashboardInputs {
    type Error = AppError;

    fn try_from(query: DashboardQuery) -> Result<Self, Self::Error> {
        let defaults = DashboardInputs::default();

        let ticker = match query.ticker {
            Some(t) => normalize_ticker(&t)?,
            None => defaults.ticker,
        };

        let start = parse_date_or("start", query.start.as_deref(), defaults.start)?;
        let end = parse_date_or("end", query.end.as_deref(), defaults.end)?;

        let sma_window =
            check_window("SMA", query.sma.as_deref(), defaults.sma_window, SMA_WINDOW_RANGE)?;
        let ema_window =
            check_window("EMA", query.ema.as_deref(), defaults.ema_window, EMA_WINDOW_RANGE)?;
        let rsi_window =
            check_window("RSI", query.rsi.as_deref(), defaults.rsi_window, RSI_WINDOW_RANGE)?;

        Ok(Self {
            ticker,
            start,
            end,
            sma_window,
            ema_window,
            rsi_window,
        })
    }
}

impl DashboardInputs {
    /// Query string that reproduces these inputs, used for the export link.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("ticker", &self.ticker)
            .append_pair("start", &self.start.to_string())
            .append_pair("end", &self.end.to_string())
            .append_pair("sma", &self.sma_window.to_string())
            .append_pair("ema", &self.ema_window.to_string())
            .append_pair("rsi", &self.rsi_window.to_string())
            .finish()
    }

    pub fn csv_filename(&self) -> String {
        csv_filename(&self.ticker)
    }
}

pub fn csv_filename(ticker: &str) -> String {
    format!("{}_history.csv", ticker)
}

/// Trims and upper-cases a user-supplied symbol.
pub fn normalize_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker must not be empty".into()));
    }
    if ticker.chars().any(|c| c.is_whitespace() || c == '/' || c == '?' || c == '&' || c == '#') {
        return Err(AppError::Validation(format!("Invalid ticker: {}", ticker)));
    }
    Ok(ticker)
}

fn parse_date_or(field: &str, raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            AppError::Validation(format!("Invalid {} date '{}': {}", field, s, e))
        }),
        None => Ok(default),
    }
}

fn check_window(
    label: &str,
    raw: Option<&str>,
    default: usize,
    (min, max): (usize, usize),
) -> Result<usize, AppError> {
    let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<usize>().map_err(|_| {
            AppError::Validation(format!(
                "{} window must be a whole number between {} and {}, got '{}'",
                label, min, max, s
            ))
        })?,
        None => default,
    };
    if value < min || value > max {
        return Err(AppError::Validation(format!(
            "{} window must be between {} and {}, got {}",
            label, min, max, value
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub indicator: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub url: String,
}

/// Everything the page renders after a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub inputs: DashboardInputs,
    pub header: String,
    pub latest_close: String,
    pub latest_volume: String,
    pub export: CsvExport,
    pub price_chart: Figure,
    pub rsi_chart: Figure,
    pub preview: Vec<IndicatorRow>,
    pub summary: Vec<SummaryRow>,
    pub row_count: usize,
    pub notice: String,
}
