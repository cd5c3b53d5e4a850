pub mod alphavantage;
pub mod price_provider;
pub mod twelvedata;
pub mod yahoofinance;
