//! Simple Moving Average (SMA) indicator.

/// Mean of the last `period` prices.
///
/// A series shorter than `period` yields its most recent price unchanged.
/// An empty series or a zero period yields 0.
pub fn sma(prices: &[f64], period: usize) -> f64 {
    if prices.is_empty() || period == 0 {
        return 0.0;
    }

    if prices.len() < period {
        return prices[prices.len() - 1];
    }

    prices[prices.len() - period..].iter().sum::<f64>() / period as f64
}
