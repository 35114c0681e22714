use serde::{Deserialize, Serialize};

use super::Candle;

/// Directional call produced by an analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    /// Get display label for this action.
    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Moving-average trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Indicator values behind the hourly signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    /// Short moving average (7 periods on the standard analyzer).
    pub sma7: f64,
    /// Long moving average (25 periods on the standard analyzer).
    pub sma25: f64,
    /// RSI rounded to 2 decimals, in [0, 100].
    pub rsi: f64,
    /// Momentum in percent rounded to 2 decimals.
    pub momentum: f64,
    pub trend: Trend,
}

/// Signal computed for one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeSignal {
    pub signal: SignalAction,
    /// Confidence 0-100.
    pub confidence: u8,
    pub reason: String,
    pub timeframe: String,
}

/// Signal derived from candlestick patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSignal {
    pub signal: SignalAction,
    pub confidence: u8,
    pub reason: String,
    /// Distinct patterns in first-seen order.
    pub patterns: Vec<CandlePattern>,
    pub timeframe: String,
}

/// Candlestick pattern detected in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandlePattern {
    Doji,
    DragonflyDoji,
    GravestoneDoji,
    Hammer,
    HangingMan,
    InvertedHammer,
    ShootingStar,
    BullishMarubozu,
    BearishMarubozu,
    BigBullish,
    BigBearish,
    SpinningTop,
    BullishEngulfing,
    BearishEngulfing,
}

impl CandlePattern {
    /// Wire name of the pattern.
    pub fn name(&self) -> &'static str {
        match self {
            CandlePattern::Doji => "DOJI",
            CandlePattern::DragonflyDoji => "DRAGONFLY_DOJI",
            CandlePattern::GravestoneDoji => "GRAVESTONE_DOJI",
            CandlePattern::Hammer => "HAMMER",
            CandlePattern::HangingMan => "HANGING_MAN",
            CandlePattern::InvertedHammer => "INVERTED_HAMMER",
            CandlePattern::ShootingStar => "SHOOTING_STAR",
            CandlePattern::BullishMarubozu => "BULLISH_MARUBOZU",
            CandlePattern::BearishMarubozu => "BEARISH_MARUBOZU",
            CandlePattern::BigBullish => "BIG_BULLISH",
            CandlePattern::BigBearish => "BIG_BEARISH",
            CandlePattern::SpinningTop => "SPINNING_TOP",
            CandlePattern::BullishEngulfing => "BULLISH_ENGULFING",
            CandlePattern::BearishEngulfing => "BEARISH_ENGULFING",
        }
    }
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Full multi-timeframe analysis for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub symbol: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub price_change_percent_24h: f64,
    /// Hourly signal, flattened into the top level.
    #[serde(flatten)]
    pub hourly: TimeframeSignal,
    pub indicators: IndicatorSet,
    /// Last 10 hourly candles.
    pub recent_candles: Vec<Candle>,
    pub short_term_signal: TimeframeSignal,
    pub five_min_signal: TimeframeSignal,
    pub pattern_signal: PatternSignal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_min_pattern_signal: Option<PatternSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_minute_signal: Option<TimeframeSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_minute_pattern_signal: Option<PatternSignal>,
    /// Unix timestamp (milliseconds) when calculated.
    pub timestamp: i64,
}
