//! Candlestick pattern classification.
//!
//! Single-candle shapes are classified by a priority cascade over body,
//! range and wick sizes; the first matching family wins. Two-candle
//! engulfing patterns are detected separately over adjacent pairs.

use crate::types::{Candle, CandlePattern};

/// Number of most recent candles scanned for patterns.
pub const PATTERN_WINDOW: usize = 10;

/// Classify a single candle.
///
/// Families are tried in order: doji, hammer, shooting star, marubozu,
/// big candle, spinning top. Returns `None` when no family matches.
pub fn classify(candle: &Candle) -> Option<CandlePattern> {
    let body = candle.body();
    let range = candle.range();
    let upper_wick = candle.upper_wick();
    let lower_wick = candle.lower_wick();
    let bullish = candle.is_bullish();

    // Doji: body under 10% of the range
    if body < range * 0.1 && range > 0.0 {
        if upper_wick > body * 2.0 && lower_wick > body * 2.0 {
            return Some(CandlePattern::Doji);
        }
        if lower_wick > body * 3.0 && upper_wick < body {
            return Some(CandlePattern::DragonflyDoji);
        }
        if upper_wick > body * 3.0 && lower_wick < body {
            return Some(CandlePattern::GravestoneDoji);
        }
        return Some(CandlePattern::Doji);
    }

    // Hammer / hanging man: long lower wick, body at the top
    if lower_wick > body * 2.0 && upper_wick < body * 0.5 && body > 0.0 {
        return Some(if bullish {
            CandlePattern::Hammer
        } else {
            CandlePattern::HangingMan
        });
    }

    // Inverted hammer / shooting star: long upper wick, body at the bottom
    if upper_wick > body * 2.0 && lower_wick < body * 0.5 && body > 0.0 {
        return Some(if bullish {
            CandlePattern::InvertedHammer
        } else {
            CandlePattern::ShootingStar
        });
    }

    if body > range * 0.9 && range > 0.0 {
        return Some(if bullish {
            CandlePattern::BullishMarubozu
        } else {
            CandlePattern::BearishMarubozu
        });
    }

    if body > range * 0.7 && range > 0.0 {
        return Some(if bullish {
            CandlePattern::BigBullish
        } else {
            CandlePattern::BigBearish
        });
    }

    // Spinning top: small body, balanced wicks
    if body < range * 0.3 && (upper_wick - lower_wick).abs() < range * 0.2 {
        return Some(CandlePattern::SpinningTop);
    }

    None
}

/// Detect an engulfing pattern formed by `prev` followed by `curr`.
pub fn detect_engulfing(prev: &Candle, curr: &Candle) -> Option<CandlePattern> {
    let prev_body = prev.body();
    let curr_body = curr.body();

    if prev.is_bearish()
        && curr.is_bullish()
        && curr.open <= prev.close
        && curr.close >= prev.open
        && curr_body > prev_body
    {
        return Some(CandlePattern::BullishEngulfing);
    }

    if prev.is_bullish()
        && curr.is_bearish()
        && curr.open >= prev.close
        && curr.close <= prev.open
        && curr_body > prev_body
    {
        return Some(CandlePattern::BearishEngulfing);
    }

    None
}

/// All pattern hits in the last [`PATTERN_WINDOW`] candles.
///
/// Single-candle hits come first in candle order, followed by engulfing hits
/// in pair order. Duplicates are kept so each hit can be scored.
pub fn detect_patterns(candles: &[Candle]) -> Vec<CandlePattern> {
    let window = &candles[candles.len().saturating_sub(PATTERN_WINDOW)..];

    let singles = window.iter().filter_map(classify);
    let pairs = window
        .windows(2)
        .filter_map(|pair| detect_engulfing(&pair[0], &pair[1]));

    singles.chain(pairs).collect()
}
