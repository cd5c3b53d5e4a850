use chrono::NaiveDate;

use crate::models::{Axis, Figure, Layout, RangeSlider, Shape, Trace, IndicatorRow};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

fn dates(rows: &[IndicatorRow]) -> Vec<NaiveDate> {
    rows.iter().map(|r| r.bar.date).collect()
}

/// Close price overlaid with SMA and EMA, with a range slider under the x-axis.
pub fn price_chart(ticker: &str, rows: &[IndicatorRow], sma_window: usize, ema_window: usize) -> Figure {
    let x = dates(rows);

    let data = vec![
        Trace::line("Close", x.clone(), rows.iter().map(|r| r.bar.close).collect()).with_width(1.5),
        Trace::line(format!("SMA ({})", sma_window), x.clone(), rows.iter().map(|r| r.sma).collect())
            .with_width(1.0),
        Trace::line(format!("EMA ({})", ema_window), x, rows.iter().map(|r| r.ema).collect())
            .with_width(1.0),
    ];

    Figure {
        data,
        layout: Layout {
            title: format!("{} Price with SMA/EMA", ticker).into(),
            xaxis: Axis {
                rangeslider: Some(RangeSlider { visible: true }),
                ..Axis::titled("Date")
            },
            yaxis: Axis::titled("Price"),
            shapes: Vec::new(),
        },
    }
}

/// RSI oscillator with dashed guides at the overbought and oversold levels.
pub fn rsi_chart(rows: &[IndicatorRow], rsi_window: usize) -> Figure {
    let data = vec![Trace::line(
        format!("RSI ({})", rsi_window),
        dates(rows),
        rows.iter().map(|r| r.rsi).collect(),
    )];

    Figure {
        data,
        layout: Layout {
            title: "RSI".into(),
            xaxis: Axis::titled("Date"),
            yaxis: Axis::titled("RSI"),
            shapes: vec![
                Shape::hline(RSI_OVERBOUGHT, "red"),
                Shape::hline(RSI_OVERSOLD, "green"),
            ],
        },
    }
}
