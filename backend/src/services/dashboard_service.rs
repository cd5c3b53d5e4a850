use tracing::info;

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{
    CsvExport, DashboardInputs, DashboardView, IndicatorRow, PriceSeries, SummaryRow, PREVIEW_ROWS,
};
use crate::services::{chart_service, csv_export_service, indicators, market_data_service};

pub const EXPORT_PATH: &str = "/api/dashboard/export";
pub const COMPLETION_NOTICE: &str =
    "Analysis complete. Use the CSV download to export historical data.";

/// Attaches SMA, EMA and RSI columns computed over the full close series.
pub fn compute_indicators(series: &PriceSeries, inputs: &DashboardInputs) -> Vec<IndicatorRow> {
    let closes = series.closes();
    let sma = indicators::sma(&closes, inputs.sma_window);
    let ema = indicators::ema(&closes, inputs.ema_window);
    let rsi = indicators::rsi(&closes, inputs.rsi_window);

    series
        .bars
        .iter()
        .zip(sma)
        .zip(ema)
        .zip(rsi)
        .map(|(((bar, sma), ema), rsi)| IndicatorRow {
            bar: bar.clone(),
            sma,
            ema,
            rsi,
        })
        .collect()
}

/// One full pass: fetch, compute, and build the rows shared by every output.
pub async fn analyze(
    provider: &dyn PriceProvider,
    inputs: &DashboardInputs,
) -> Result<(PriceSeries, Vec<IndicatorRow>), AppError> {
    let series =
        market_data_service::fetch_series(provider, &inputs.ticker, inputs.start, inputs.end).await?;
    let rows = compute_indicators(&series, inputs);
    Ok((series, rows))
}

pub async fn build_dashboard(
    provider: &dyn PriceProvider,
    inputs: &DashboardInputs,
) -> Result<DashboardView, AppError> {
    let (series, rows) = analyze(provider, inputs).await?;
    let view = render(&series, rows, inputs)?;
    info!("Rendered dashboard for {} ({} rows)", view.inputs.ticker, view.row_count);
    Ok(view)
}

pub async fn export_csv(
    provider: &dyn PriceProvider,
    inputs: &DashboardInputs,
) -> Result<Vec<u8>, AppError> {
    let (_, rows) = analyze(provider, inputs).await?;
    let bytes = csv_export_service::to_csv(&rows)?;
    info!("Exported {} rows for {}", rows.len(), inputs.ticker);
    Ok(bytes)
}

/// Builds the view from a non-empty series; `NoData` if `rows` is empty.
pub fn render(
    series: &PriceSeries,
    rows: Vec<IndicatorRow>,
    inputs: &DashboardInputs,
) -> Result<DashboardView, AppError> {
    let (Some(first), Some(latest)) = (rows.first(), rows.last()) else {
        return Err(AppError::NoData);
    };

    let ticker = series.ticker.as_str();
    let header = format!("{} — {} to {}", ticker, first.bar.date, latest.bar.date);
    let latest_close = format!("{:.2}", latest.bar.close);
    let latest_volume = format_thousands(latest.bar.volume);
    let summary = summary_rows(latest, inputs);

    let view_inputs = DashboardInputs {
        ticker: ticker.to_string(),
        ..inputs.clone()
    };
    let export = CsvExport {
        filename: view_inputs.csv_filename(),
        url: format!("{}?{}", EXPORT_PATH, view_inputs.to_query_string()),
    };

    let price_chart = chart_service::price_chart(ticker, &rows, inputs.sma_window, inputs.ema_window);
    let rsi_chart = chart_service::rsi_chart(&rows, inputs.rsi_window);

    let row_count = rows.len();
    let preview = rows[row_count.saturating_sub(PREVIEW_ROWS)..].to_vec();

    Ok(DashboardView {
        inputs: view_inputs,
        header,
        latest_close,
        latest_volume,
        export,
        price_chart,
        rsi_chart,
        preview,
        summary,
        row_count,
        notice: COMPLETION_NOTICE.to_string(),
    })
}

pub fn summary_rows(latest: &IndicatorRow, inputs: &DashboardInputs) -> Vec<SummaryRow> {
    [
        ("Close".to_string(), latest.bar.close),
        (format!("SMA({})", inputs.sma_window), latest.sma),
        (format!("EMA({})", inputs.ema_window), latest.ema),
        (format!("RSI({})", inputs.rsi_window), latest.rsi),
    ]
    .into_iter()
    .map(|(indicator, value)| SummaryRow {
        indicator,
        value: format!("{:.2}", value),
    })
    .collect()
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
