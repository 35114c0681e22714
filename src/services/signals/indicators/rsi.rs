//! Relative Strength Index (RSI) indicator.

/// Neutral RSI reported when history is too short.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI over the last `period` price changes.
///
/// Gains and losses are plain averages over the window, not Wilder-smoothed
/// from the start of the series. Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Fewer than `period + 1` prices yields [`NEUTRAL_RSI`]. A window without
/// losses yields 100.
pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in prices.len() - period..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses += -change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
