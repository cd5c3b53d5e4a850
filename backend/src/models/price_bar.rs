use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// One trading day for a ticker, as reported by a price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

// A price bar with the derived indicator columns attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub sma: f64,
    pub ema: f64,
    pub rsi: f64,
}

/// Daily history for one ticker, ascending by date with no duplicate dates.
///
/// Built fresh for every dashboard run and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
