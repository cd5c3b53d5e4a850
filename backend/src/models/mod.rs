mod chart;
mod dashboard;
mod price_bar;

pub use chart::{Axis, Figure, Layout, LineStyle, RangeSlider, Shape, Title, Trace};
pub use dashboard::{
    csv_filename, default_start_date, normalize_ticker, CsvExport, DashboardInputs,
    DashboardQuery, DashboardView, SummaryRow, DEFAULT_EMA_WINDOW, DEFAULT_RSI_WINDOW,
    DEFAULT_SMA_WINDOW, DEFAULT_TICKER, EMA_WINDOW_RANGE, PREVIEW_ROWS, RSI_WINDOW_RANGE,
    SMA_WINDOW_RANGE,
};
pub use price_bar::{IndicatorRow, PriceBar, PriceSeries};
