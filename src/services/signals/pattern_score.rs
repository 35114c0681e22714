//! Pattern-based signal scoring.
//!
//! Every detected pattern credits a fixed weight to one side; indecision
//! patterns credit both sides equally.

use crate::services::signals::patterns::detect_patterns;
use crate::services::signals::{decide, round_confidence, ScoreCard, Side};
use crate::types::{Candle, CandlePattern, PatternSignal, SignalAction};

/// Score assigned to each side when no pattern is found.
const NO_PATTERN_SCORE: u32 = 50;

/// Maximum number of reasons joined into the signal text.
const MAX_REASONS: usize = 3;

/// Contribution of one pattern hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternImpact {
    Buy(u32),
    Sell(u32),
    /// Credited to both sides.
    Neutral(u32),
}

impl CandlePattern {
    pub fn impact(&self) -> PatternImpact {
        match self {
            CandlePattern::Hammer => PatternImpact::Buy(20),
            CandlePattern::InvertedHammer => PatternImpact::Buy(15),
            CandlePattern::DragonflyDoji => PatternImpact::Buy(18),
            CandlePattern::BullishMarubozu => PatternImpact::Buy(25),
            CandlePattern::BigBullish => PatternImpact::Buy(20),
            CandlePattern::BullishEngulfing => PatternImpact::Buy(25),
            CandlePattern::ShootingStar => PatternImpact::Sell(20),
            CandlePattern::HangingMan => PatternImpact::Sell(18),
            CandlePattern::GravestoneDoji => PatternImpact::Sell(18),
            CandlePattern::BearishMarubozu => PatternImpact::Sell(25),
            CandlePattern::BigBearish => PatternImpact::Sell(20),
            CandlePattern::BearishEngulfing => PatternImpact::Sell(25),
            CandlePattern::Doji | CandlePattern::SpinningTop => PatternImpact::Neutral(5),
        }
    }

    /// Reason text for directional patterns.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            CandlePattern::Hammer => Some("Hammer pattern (bullish reversal)"),
            CandlePattern::InvertedHammer => Some("Inverted Hammer (potential bullish)"),
            CandlePattern::DragonflyDoji => Some("Dragonfly Doji (bullish signal)"),
            CandlePattern::BullishMarubozu => Some("Bullish Marubozu (strong buying)"),
            CandlePattern::BigBullish => Some("Big Bullish candle"),
            CandlePattern::BullishEngulfing => Some("Bullish Engulfing pattern"),
            CandlePattern::ShootingStar => Some("Shooting Star (bearish reversal)"),
            CandlePattern::HangingMan => Some("Hanging Man (bearish warning)"),
            CandlePattern::GravestoneDoji => Some("Gravestone Doji (bearish signal)"),
            CandlePattern::BearishMarubozu => Some("Bearish Marubozu (strong selling)"),
            CandlePattern::BigBearish => Some("Big Bearish candle"),
            CandlePattern::BearishEngulfing => Some("Bearish Engulfing pattern"),
            CandlePattern::Doji | CandlePattern::SpinningTop => None,
        }
    }

    fn side(&self) -> Option<Side> {
        match self.impact() {
            PatternImpact::Buy(_) => Some(Side::Buy),
            PatternImpact::Sell(_) => Some(Side::Sell),
            PatternImpact::Neutral(_) => None,
        }
    }
}

/// Pattern score analyzer for one timeframe.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    timeframe: String,
}

impl PatternAnalyzer {
    pub fn new(timeframe: impl Into<String>) -> Self {
        Self {
            timeframe: timeframe.into(),
        }
    }

    /// Score the patterns in the most recent window of `candles`.
    ///
    /// # Panics
    ///
    /// Panics if `candles` is empty.
    pub fn analyze(&self, candles: &[Candle]) -> PatternSignal {
        assert!(!candles.is_empty(), "pattern analysis requires at least one candle");
        self.score(&detect_patterns(candles))
    }

    /// Score an already detected list of pattern hits.
    pub fn score(&self, hits: &[CandlePattern]) -> PatternSignal {
        let mut scores = ScoreCard::default();
        for hit in hits {
            match hit.impact() {
                PatternImpact::Buy(weight) => scores.add(Side::Buy, weight),
                PatternImpact::Sell(weight) => scores.add(Side::Sell, weight),
                PatternImpact::Neutral(weight) => scores.split(weight),
            }
        }

        if hits.is_empty() {
            scores = ScoreCard {
                buy: NO_PATTERN_SCORE,
                sell: NO_PATTERN_SCORE,
            };
        }

        let (signal, confidence) = decide(scores.buy_confidence());
        let reason = match signal {
            SignalAction::Buy => side_reason(hits, Side::Buy, "Bullish patterns detected"),
            SignalAction::Sell => side_reason(hits, Side::Sell, "Bearish patterns detected"),
            SignalAction::Hold => "No clear candlestick patterns detected".to_string(),
        };

        PatternSignal {
            signal,
            confidence: round_confidence(confidence),
            reason,
            patterns: dedup(hits),
            timeframe: self.timeframe.clone(),
        }
    }
}

/// Up to [`MAX_REASONS`] distinct reasons for `side`, in hit order.
fn side_reason(hits: &[CandlePattern], side: Side, fallback: &str) -> String {
    let mut reasons: Vec<&'static str> = Vec::new();
    for hit in hits.iter().filter(|h| h.side() == Some(side)) {
        if let Some(reason) = hit.reason() {
            if !reasons.contains(&reason) {
                reasons.push(reason);
            }
        }
    }
    reasons.truncate(MAX_REASONS);

    if reasons.is_empty() {
        fallback.to_string()
    } else {
        reasons.join(". ")
    }
}

fn dedup(hits: &[CandlePattern]) -> Vec<CandlePattern> {
    let mut seen = Vec::with_capacity(hits.len());
    for hit in hits {
        if !seen.contains(hit) {
            seen.push(*hit);
        }
    }
    seen
}
