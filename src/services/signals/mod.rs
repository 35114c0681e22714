//! Trading signals service module.
//!
//! Provides indicator calculations, the weighted trend scoring policy,
//! candlestick pattern classification and scoring, and the orchestrator that
//! combines them into one multi-timeframe analysis.
//!
//! Everything here is a pure computation over an in-memory candle series.

pub mod analysis;
pub mod indicators;
pub mod pattern_score;
pub mod patterns;
pub mod trend;

pub use analysis::{SignalEngine, TimeframeSeries};
pub use pattern_score::{PatternAnalyzer, PatternImpact};
pub use patterns::{classify, detect_engulfing, detect_patterns, PATTERN_WINDOW};
pub use trend::{TrendAnalyzer, TrendConfig};

use crate::types::SignalAction;

/// Buy confidence above which the call is BUY.
pub const BUY_THRESHOLD: f64 = 55.0;

/// Buy confidence below which the call is SELL.
pub const SELL_THRESHOLD: f64 = 45.0;

/// Confidence reported for HOLD.
pub const HOLD_CONFIDENCE: f64 = 50.0;

/// Side a scoring rule credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

/// Accumulated buy and sell scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCard {
    pub buy: u32,
    pub sell: u32,
}

impl ScoreCard {
    /// Credit `weight` to one side.
    pub fn add(&mut self, side: Side, weight: u32) {
        match side {
            Side::Buy => self.buy += weight,
            Side::Sell => self.sell += weight,
        }
    }

    /// Credit `weight` to both sides.
    pub fn split(&mut self, weight: u32) {
        self.buy += weight;
        self.sell += weight;
    }

    pub fn total(&self) -> u32 {
        self.buy + self.sell
    }

    /// Share of the total score on the buy side, as a percentage.
    /// An empty card is neutral (50).
    pub fn buy_confidence(&self) -> f64 {
        match self.total() {
            0 => HOLD_CONFIDENCE,
            total => self.buy as f64 / total as f64 * 100.0,
        }
    }

    /// Complement of [`ScoreCard::buy_confidence`].
    pub fn sell_confidence(&self) -> f64 {
        100.0 - self.buy_confidence()
    }
}

/// Map a buy confidence to a call and its confidence.
///
/// The band [45, 55] is HOLD at a fixed 50; SELL reports the sell-side share.
pub fn decide(buy_confidence: f64) -> (SignalAction, f64) {
    if buy_confidence > BUY_THRESHOLD {
        (SignalAction::Buy, buy_confidence)
    } else if buy_confidence < SELL_THRESHOLD {
        (SignalAction::Sell, 100.0 - buy_confidence)
    } else {
        (SignalAction::Hold, HOLD_CONFIDENCE)
    }
}

/// Round a 0-100 confidence to an integer percentage.
pub fn round_confidence(confidence: f64) -> u8 {
    confidence.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // ScoreCard Tests
    // =========================================================================

    #[test]
    fn test_empty_scorecard_is_neutral() {
        let card = ScoreCard::default();
        assert_eq!(card.buy_confidence(), 50.0);
        assert_eq!(card.sell_confidence(), 50.0);
    }

    #[test]
    fn test_scorecard_add_and_split() {
        let mut card = ScoreCard::default();
        card.add(Side::Buy, 20);
        card.add(Side::Sell, 15);
        card.split(5);
        assert_eq!(card, ScoreCard { buy: 25, sell: 20 });
        assert_eq!(card.total(), 45);
    }

    #[test]
    fn test_confidences_are_complementary() {
        for (buy, sell) in [(0, 10), (10, 0), (35, 65), (70, 25), (1, 2), (0, 0)] {
            let card = ScoreCard { buy, sell };
            let sum = card.buy_confidence() + card.sell_confidence();
            assert!((sum - 100.0).abs() < 1e-9, "buy={} sell={}", buy, sell);
        }
    }

    // =========================================================================
    // Decision Rule Tests
    // =========================================================================

    #[test]
    fn test_decide_boundaries() {
        assert_eq!(decide(45.0), (SignalAction::Hold, 50.0));
        assert_eq!(decide(45.01), (SignalAction::Hold, 50.0));
        assert_eq!(decide(55.0), (SignalAction::Hold, 50.0));
        assert_eq!(decide(55.01).0, SignalAction::Buy);
        assert_eq!(decide(44.99).0, SignalAction::Sell);
    }

    #[test]
    fn test_decide_buy_keeps_buy_confidence() {
        let (action, confidence) = decide(73.5);
        assert_eq!(action, SignalAction::Buy);
        assert_eq!(confidence, 73.5);
    }

    #[test]
    fn test_decide_sell_reports_sell_share() {
        let (action, confidence) = decide(20.0);
        assert_eq!(action, SignalAction::Sell);
        assert_eq!(confidence, 80.0);
    }

    #[test]
    fn test_round_confidence() {
        assert_eq!(round_confidence(73.68), 74);
        assert_eq!(round_confidence(50.0), 50);
        assert_eq!(round_confidence(62.5), 63);
        assert_eq!(round_confidence(100.0), 100);
    }
}
