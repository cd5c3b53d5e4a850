use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;

pub const NO_DATA_MESSAGE: &str =
    "No data returned for that ticker / date range. Try another ticker or date range.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error fetching data for {ticker}: {cause}")]
    FetchFailed {
        ticker: String,
        cause: PriceProviderError,
    },
    #[error("{}", NO_DATA_MESSAGE)]
    NoData,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Whether the dashboard shows the message as a hard error or a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub level: MessageLevel,
    pub message: String,
}

impl AppError {
    pub fn fetch_failed(ticker: &str, cause: PriceProviderError) -> Self {
        AppError::FetchFailed {
            ticker: ticker.to_string(),
            cause,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::NoData => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn level(&self) -> MessageLevel {
        match self {
            AppError::NoData => MessageLevel::Warning,
            _ => MessageLevel::Error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            level: self.level(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", value))
    }
}
