/// Added to the smoothed loss before dividing so a loss-free stretch does not
/// divide by zero.
pub const RSI_EPSILON: f64 = 1e-9;

/// RSI reported for the first row, where no price change exists yet.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - for the first `window - 1` points, the mean of every point seen so far
/// - afterwards, the mean of the trailing `window` points
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);

    // Running sum carried by scan; the value that falls out of the window is subtracted.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let count = (i + 1).min(window);
            Some(*sum / count as f64)
        })
        .collect()
}

/// Exponential Moving Average (EMA)
///
/// Smoothing factor follows the span convention, `alpha = 2 / (window + 1)`,
/// seeded with the first observation so every point has a value.
pub fn ema(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window.max(1) as f64 + 1.0);
    exponential_smoothing(values, alpha)
}

/// Recursive exponential smoothing:
/// `out[0] = values[0]`, `out[i] = alpha * values[i] + (1 - alpha) * out[i - 1]`.
fn exponential_smoothing(values: &[f64], alpha: f64) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    std::iter::once(first)
        .chain(values[1..].iter().scan(first, move |prev, &v| {
            let next = alpha * v + (1.0 - alpha) * *prev;
            *prev = next;
            Some(next)
        }))
        .collect()
}

/// Relative Strength Index (RSI)
///
/// Measures momentum by comparing recent gains to recent losses.
/// RSI values range from 0 to 100:
/// - Below 30: Oversold condition
/// - Above 70: Overbought condition
///
/// Calculation:
/// 1. Price changes between consecutive closes
/// 2. Gains (positive changes) and losses (magnitude of negative changes)
/// 3. Wilder's smoothing of both with `alpha = 1 / period`, seeded from the first change
/// 4. RS = avg_gain / (avg_loss + 1e-9)
/// 5. RSI = 100 - (100 / (1 + RS))
///
/// The output is aligned with `prices`. The first row has no change behind it
/// and reports `RSI_NEUTRAL`.
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|&c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| (-c).max(0.0)).collect();

    let alpha = 1.0 / period.max(1) as f64;
    let avg_gains = exponential_smoothing(&gains, alpha);
    let avg_losses = exponential_smoothing(&losses, alpha);

    std::iter::once(RSI_NEUTRAL)
        .chain(
            avg_gains
                .iter()
                .zip(avg_losses.iter())
                .map(|(&gain, &loss)| rsi_from_averages(gain, loss)),
        )
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / (avg_loss + RSI_EPSILON);
    100.0 - (100.0 / (1.0 + rs))
}
