use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::external::alphavantage::AlphaVantageProvider;
use crate::external::price_provider::PriceProvider;
use crate::external::twelvedata::TwelveDataProvider;
use crate::external::yahoofinance::YahooFinanceProvider;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR '{0}': {1}")]
    BindAddr(String, std::net::AddrParseError),
    #[error("Invalid PRICE_PROVIDER: {0}. Must be 'yahoo', 'twelvedata', or 'alphavantage'")]
    UnknownProvider(String),
    #[error("Failed to create {provider} provider: {reason}")]
    Provider { provider: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    TwelveData,
    AlphaVantage,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" | "yahoofinance" => Ok(ProviderKind::Yahoo),
            "twelvedata" => Ok(ProviderKind::TwelveData),
            "alphavantage" => Ok(ProviderKind::AlphaVantage),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::BindAddr(bind_addr.clone(), e))?;

        // Select price provider based on PRICE_PROVIDER env var (defaults to yahoo)
        let provider = std::env::var("PRICE_PROVIDER")
            .unwrap_or_else(|_| "yahoo".to_string())
            .parse::<ProviderKind>()?;

        Ok(Self { bind_addr, provider })
    }

    pub fn build_provider(&self) -> Result<Arc<dyn PriceProvider>, ConfigError> {
        let provider: Arc<dyn PriceProvider> = match self.provider {
            ProviderKind::Yahoo => {
                info!("📊 Using price provider: Yahoo Finance");
                Arc::new(YahooFinanceProvider::new())
            }
            ProviderKind::TwelveData => {
                info!("📊 Using price provider: Twelve Data");
                Arc::new(TwelveDataProvider::from_env().map_err(|e| ConfigError::Provider {
                    provider: "twelvedata",
                    reason: e.to_string(),
                })?)
            }
            ProviderKind::AlphaVantage => {
                info!("📊 Using price provider: Alpha Vantage");
                Arc::new(AlphaVantageProvider::from_env().map_err(|e| ConfigError::Provider {
                    provider: "alphavantage",
                    reason: e.to_string(),
                })?)
            }
        };
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("yahoo".parse::<ProviderKind>().unwrap(), ProviderKind::Yahoo);
        assert_eq!(" TwelveData ".parse::<ProviderKind>().unwrap(), ProviderKind::TwelveData);
        assert_eq!("alphavantage".parse::<ProviderKind>().unwrap(), ProviderKind::AlphaVantage);
        assert!(matches!(
            "multi".parse::<ProviderKind>(),
            Err(ConfigError::UnknownProvider(_))
        ));
    }
}
