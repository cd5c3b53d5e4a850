use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::models::IndicatorRow;

pub const CSV_HEADER: [&str; 9] = [
    "Date", "Open", "High", "Low", "Close", "Volume", "SMA", "EMA", "RSI",
];

/// Serializes the full indicator table as UTF-8 CSV with a header row.
///
/// Values are written as computed; floats use their shortest round-trip form.
pub fn to_csv(rows: &[IndicatorRow]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for row in rows {
        let bar = &row.bar;
        writer
            .write_record(&[
                bar.date.format("%Y-%m-%d").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
                row.sma.to_string(),
                row.ema.to_string(),
                row.rsi.to_string(),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", bar.date))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
}
