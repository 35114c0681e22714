//! Technical indicator implementations.
//!
//! All indicators are pure functions over a closing-price series. None of
//! them fail on short input; each documents its own fallback value.

pub mod momentum;
pub mod rsi;
pub mod sma;

pub use momentum::momentum;
pub use rsi::{rsi, NEUTRAL_RSI};
pub use sma::sma;

/// Round half up to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}
