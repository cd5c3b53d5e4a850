//! Dashboard API Tests
//!
//! Drives the full router (fetch -> compute -> render) against an in-memory
//! price provider:
//! - GET /api/dashboard         (JSON view)
//! - GET /api/dashboard/export  (CSV download)
//! - GET /api/prices/:ticker    (raw bars)
//! - GET /health and GET /

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use stock_dashboard::app::create_app;
use stock_dashboard::external::price_provider::{PriceProvider, PriceProviderError};
use stock_dashboard::models::PriceBar;
use stock_dashboard::state::AppState;

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

/// Serves the first AAPL trading days of 2023; any other symbol is unknown.
struct StubProvider;

fn aapl_bars() -> Vec<PriceBar> {
    let rows = [
        ((2023, 1, 3), 130.28, 130.90, 124.17, 125.07, 112_117_500),
        ((2023, 1, 4), 126.89, 128.66, 125.08, 126.36, 89_113_600),
        ((2023, 1, 5), 127.13, 127.77, 124.76, 125.02, 80_962_700),
        ((2023, 1, 6), 126.01, 130.29, 124.89, 129.62, 87_754_700),
        ((2023, 1, 9), 130.47, 133.41, 129.89, 130.15, 70_790_800),
        ((2023, 1, 10), 130.26, 131.26, 128.12, 130.73, 63_896_200),
        ((2023, 1, 11), 131.25, 133.51, 130.46, 133.49, 69_458_900),
    ];
    rows.iter()
        .map(|&((y, m, d), open, high, low, close, volume)| PriceBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect()
}

#[async_trait]
impl PriceProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PriceProviderError> {
        if ticker != "AAPL" {
            return Err(PriceProviderError::NotFound);
        }
        Ok(aapl_bars()
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect())
    }
}

fn app() -> Router {
    create_app(AppState::new(Arc::new(StubProvider)))
}

async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
    (status, headers, body)
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

const E2E_QUERY: &str = "ticker=AAPL&start=2023-01-01&end=2023-01-10&sma=20&ema=50&rsi=14";

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_dashboard() {
    let (status, body) = get_json(&format!("/api/dashboard?{}", E2E_QUERY)).await;
    assert_eq!(status, StatusCode::OK);

    // Inclusive end date: Jan 10 is present, Jan 11 is not
    assert_eq!(body["row_count"], 6);
    assert_eq!(body["header"], "AAPL — 2023-01-03 to 2023-01-10");
    assert_eq!(body["latest_close"], "130.73");
    assert_eq!(body["latest_volume"], "63,896,200");
    assert_eq!(body["export"]["filename"], "AAPL_history.csv");

    let preview = body["preview"].as_array().unwrap();
    assert_eq!(preview.len(), 6);
    assert_eq!(preview[0]["date"], "2023-01-03");
    assert!(preview.iter().all(|r| r["sma"].is_f64() && r["ema"].is_f64() && r["rsi"].is_f64()));

    let labels: Vec<&str> = body["summary"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["indicator"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Close", "SMA(20)", "EMA(50)", "RSI(14)"]);
    assert_eq!(body["summary"][0]["value"], "130.73");

    let traces = body["price_chart"]["data"].as_array().unwrap();
    assert_eq!(traces.len(), 3);
    assert!(traces.iter().all(|t| t["y"].as_array().unwrap().len() == 6));
    assert_eq!(body["price_chart"]["layout"]["xaxis"]["rangeslider"]["visible"], true);
    assert_eq!(body["rsi_chart"]["layout"]["shapes"][0]["y0"], 70.0);
    assert_eq!(body["rsi_chart"]["layout"]["shapes"][1]["y0"], 30.0);
}

#[tokio::test]
async fn test_lowercase_ticker_is_normalized() {
    let (status, body) =
        get_json("/api/dashboard?ticker=aapl&start=2023-01-01&end=2023-01-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputs"]["ticker"], "AAPL");
}

#[tokio::test]
async fn test_unknown_ticker_is_fetch_failure() {
    let (status, body) = get_json("/api/dashboard?ticker=NOPE&start=2023-01-01&end=2023-01-10").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["level"], "error");
    assert!(body["message"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn test_inverted_range_is_no_data() {
    let (status, body) = get_json("/api/dashboard?ticker=AAPL&start=2023-01-10&end=2023-01-01").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "warning");
    assert_eq!(
        body["message"],
        "No data returned for that ticker / date range. Try another ticker or date range."
    );
}

#[tokio::test]
async fn test_weekend_range_is_no_data() {
    let (status, body) = get_json("/api/dashboard?ticker=AAPL&start=2023-01-07&end=2023-01-08").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "warning");
}

#[tokio::test]
async fn test_out_of_range_window_rejected() {
    let (status, body) = get_json("/api/dashboard?ticker=AAPL&rsi=4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("RSI window"));
}

#[tokio::test]
async fn test_non_numeric_window_is_json_bad_request() {
    for query in ["sma=abc", "rsi=-3", "ema=1.5"] {
        let (status, headers, body) = get(&format!("/api/dashboard?ticker=AAPL&{}", query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["level"], "error");
        assert!(body["message"].as_str().unwrap().contains("window"), "{}", query);
    }
}

#[tokio::test]
async fn test_blank_window_falls_back_to_default() {
    let (status, body) =
        get_json("/api/dashboard?ticker=AAPL&start=2023-01-01&end=2023-01-10&sma=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputs"]["sma_window"], 20);
}

#[tokio::test]
async fn test_malformed_query_is_json_bad_request() {
    let (status, body) = get_json("/api/prices/AAPL?start=2023-01-01&start=2023-01-02").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["level"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("Validation error"));
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_csv_export() {
    let (status, headers, body) = get(&format!("/api/dashboard/export?{}", E2E_QUERY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"AAPL_history.csv\""
    );

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume,SMA,EMA,RSI");
    assert_eq!(lines.len(), 7);
    assert!(lines[1].starts_with("2023-01-03,130.28,130.9,124.17,125.07,112117500,125.07,125.07,50"));
    assert!(lines[6].starts_with("2023-01-10,"));
}

#[tokio::test]
async fn test_csv_export_is_idempotent() {
    let uri = format!("/api/dashboard/export?{}", E2E_QUERY);
    let (_, _, first) = get(&uri).await;
    let (_, _, second) = get(&uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_csv_export_unknown_ticker() {
    let (status, _, _) = get("/api/dashboard/export?ticker=NOPE&start=2023-01-01&end=2023-01-10").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_csv_export_bad_window_is_json() {
    let (status, body) = get_json("/api/dashboard/export?ticker=AAPL&sma=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("SMA window"));
}

// ---------------------------------------------------------------------------
// Prices, health, page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_raw_prices() {
    let (status, body) = get_json("/api/prices/aapl?start=2023-01-04&end=2023-01-05").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(body["bars"].as_array().unwrap().len(), 2);
    assert_eq!(body["bars"][1]["volume"], 80_962_700);
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_dashboard_page() {
    let (status, headers, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Fetch &amp; Analyze"));
}
