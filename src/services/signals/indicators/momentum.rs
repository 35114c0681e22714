//! Momentum (rate of change) indicator.

/// Percent change between the latest price and the price `period` entries
/// from the end of the series, i.e. `prices[len - period]`.
///
/// Returns 0 when fewer than `period` prices are available.
pub fn momentum(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period {
        return 0.0;
    }

    let current = prices[prices.len() - 1];
    let past = prices[prices.len() - period];
    ((current - past) / past) * 100.0
}
