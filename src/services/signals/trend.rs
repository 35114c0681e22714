//! Weighted trend scoring over moving averages, RSI, momentum and recent
//! price direction.
//!
//! One algorithm serves every timeframe; [`TrendConfig::standard`] is tuned
//! for hourly candles and [`TrendConfig::fast`] for minute-scale candles.

use crate::services::signals::indicators::{momentum, round2, rsi, sma};
use crate::services::signals::{decide, round_confidence, ScoreCard, Side};
use crate::types::{closes, Candle, IndicatorSet, SignalAction, TimeframeSignal, Trend};

/// How momentum inside the dead band is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumTieBreak {
    /// Credit the side matching the sign of momentum (zero counts as sell).
    BySign(u32),
    /// Credit both sides equally.
    Split(u32),
}

/// Rule weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWeights {
    pub ma_cross: u32,
    /// Price vs short MA. `None` disables the rule.
    pub price_vs_ma: Option<u32>,
    pub rsi_extreme: u32,
    pub rsi_lean: u32,
    pub momentum: u32,
    pub momentum_tie_break: MomentumTieBreak,
    pub direction: u32,
}

/// Reason texts attached to triggered rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendText {
    pub ma_above: &'static str,
    pub ma_below: &'static str,
    pub price_above: &'static str,
    pub price_below: &'static str,
    pub oversold: &'static str,
    pub overbought: &'static str,
    pub momentum_up: &'static str,
    pub momentum_down: &'static str,
    pub direction_up: &'static str,
    pub direction_down: &'static str,
    /// Reason for HOLD.
    pub neutral: &'static str,
    /// Reason for BUY/SELL when no rule on the winning side left a reason.
    pub mixed: &'static str,
}

/// Parameters for one trend analyzer instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub momentum_period: usize,
    /// Momentum beyond +/- this percentage scores the full momentum weight.
    pub momentum_threshold: f64,
    /// Number of most recent closes inspected for direction.
    pub direction_lookback: usize,
    /// Up-steps at or above this count credit the buy side.
    pub bullish_up_steps: usize,
    /// Up-steps at or below this count credit the sell side.
    pub bearish_up_steps: usize,
    pub weights: TrendWeights,
    pub text: TrendText,
    pub timeframe: String,
}

impl TrendConfig {
    /// Hourly parameters: SMA 7/25, RSI 14, momentum 10, 5-close direction.
    pub fn standard() -> Self {
        Self {
            sma_short: 7,
            sma_long: 25,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            momentum_period: 10,
            momentum_threshold: 2.0,
            direction_lookback: 5,
            bullish_up_steps: 3,
            bearish_up_steps: 1,
            weights: TrendWeights {
                ma_cross: 20,
                price_vs_ma: Some(15),
                rsi_extreme: 25,
                rsi_lean: 10,
                momentum: 20,
                momentum_tie_break: MomentumTieBreak::BySign(10),
                direction: 15,
            },
            text: TrendText {
                ma_above: "Short-term MA above long-term MA",
                ma_below: "Short-term MA below long-term MA",
                price_above: "Price above 7-period MA",
                price_below: "Price below 7-period MA",
                oversold: "RSI indicates oversold",
                overbought: "RSI indicates overbought",
                momentum_up: "Strong positive momentum",
                momentum_down: "Strong negative momentum",
                direction_up: "Recent upward movement",
                direction_down: "Recent downward movement",
                neutral: "Market conditions are neutral",
                mixed: "Mixed signals",
            },
            timeframe: "1 hour".to_string(),
        }
    }

    /// Minute-scale parameters: SMA 3/7, RSI 7, momentum 5, 3-close direction.
    pub fn fast(timeframe: impl Into<String>) -> Self {
        Self {
            sma_short: 3,
            sma_long: 7,
            rsi_period: 7,
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
            momentum_period: 5,
            momentum_threshold: 0.1,
            direction_lookback: 3,
            bullish_up_steps: 2,
            bearish_up_steps: 0,
            weights: TrendWeights {
                ma_cross: 25,
                price_vs_ma: None,
                rsi_extreme: 25,
                rsi_lean: 10,
                momentum: 25,
                momentum_tie_break: MomentumTieBreak::Split(5),
                direction: 20,
            },
            text: TrendText {
                ma_above: "3-period MA above 7-period MA",
                ma_below: "3-period MA below 7-period MA",
                price_above: "Price above 3-period MA",
                price_below: "Price below 3-period MA",
                oversold: "Short-term oversold",
                overbought: "Short-term overbought",
                momentum_up: "Positive short momentum",
                momentum_down: "Negative short momentum",
                direction_up: "Recent uptrend",
                direction_down: "Recent downtrend",
                neutral: "Short-term neutral",
                mixed: "Mixed short-term signals",
            },
            timeframe: timeframe.into(),
        }
    }
}

/// Raw indicator values and scores from one pass.
#[derive(Debug, Clone)]
struct Evaluation {
    sma_short: f64,
    sma_long: f64,
    rsi: f64,
    momentum: f64,
    trend: Trend,
    scores: ScoreCard,
    reasons: Vec<(Side, &'static str)>,
}

/// Trend/score analyzer.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn standard() -> Self {
        Self::new(TrendConfig::standard())
    }

    pub fn fast(timeframe: impl Into<String>) -> Self {
        Self::new(TrendConfig::fast(timeframe))
    }

    /// Signal only.
    ///
    /// # Panics
    ///
    /// Panics if `candles` is empty.
    pub fn analyze(&self, candles: &[Candle]) -> TimeframeSignal {
        let evaluation = self.evaluate(candles);
        self.to_signal(&evaluation)
    }

    /// Signal plus the indicator set behind it.
    ///
    /// # Panics
    ///
    /// Panics if `candles` is empty.
    pub fn analyze_with_indicators(&self, candles: &[Candle]) -> (TimeframeSignal, IndicatorSet) {
        let evaluation = self.evaluate(candles);
        let indicators = IndicatorSet {
            sma7: evaluation.sma_short,
            sma25: evaluation.sma_long,
            rsi: round2(evaluation.rsi),
            momentum: round2(evaluation.momentum),
            trend: evaluation.trend,
        };
        (self.to_signal(&evaluation), indicators)
    }

    fn evaluate(&self, candles: &[Candle]) -> Evaluation {
        assert!(!candles.is_empty(), "trend analysis requires at least one candle");

        let cfg = &self.config;
        let weights = &cfg.weights;
        let text = &cfg.text;

        let prices = closes(candles);
        let current_price = prices[prices.len() - 1];

        let sma_short = sma(&prices, cfg.sma_short);
        let sma_long = sma(&prices, cfg.sma_long);
        let rsi = rsi(&prices, cfg.rsi_period);
        let momentum = momentum(&prices, cfg.momentum_period);

        let trend = if sma_short > sma_long && current_price > sma_short {
            Trend::Bullish
        } else if sma_short < sma_long && current_price < sma_short {
            Trend::Bearish
        } else {
            Trend::Neutral
        };

        let mut scores = ScoreCard::default();
        let mut reasons = Vec::new();

        // Moving average crossover
        if sma_short > sma_long {
            scores.add(Side::Buy, weights.ma_cross);
            reasons.push((Side::Buy, text.ma_above));
        } else {
            scores.add(Side::Sell, weights.ma_cross);
            reasons.push((Side::Sell, text.ma_below));
        }

        // Price vs short MA
        if let Some(weight) = weights.price_vs_ma {
            if current_price > sma_short {
                scores.add(Side::Buy, weight);
                reasons.push((Side::Buy, text.price_above));
            } else {
                scores.add(Side::Sell, weight);
                reasons.push((Side::Sell, text.price_below));
            }
        }

        // RSI
        if rsi < cfg.rsi_oversold {
            scores.add(Side::Buy, weights.rsi_extreme);
            reasons.push((Side::Buy, text.oversold));
        } else if rsi > cfg.rsi_overbought {
            scores.add(Side::Sell, weights.rsi_extreme);
            reasons.push((Side::Sell, text.overbought));
        } else if rsi < 50.0 {
            scores.add(Side::Sell, weights.rsi_lean);
        } else {
            scores.add(Side::Buy, weights.rsi_lean);
        }

        // Momentum
        if momentum > cfg.momentum_threshold {
            scores.add(Side::Buy, weights.momentum);
            reasons.push((Side::Buy, text.momentum_up));
        } else if momentum < -cfg.momentum_threshold {
            scores.add(Side::Sell, weights.momentum);
            reasons.push((Side::Sell, text.momentum_down));
        } else {
            match weights.momentum_tie_break {
                MomentumTieBreak::BySign(weight) if momentum > 0.0 => {
                    scores.add(Side::Buy, weight)
                }
                MomentumTieBreak::BySign(weight) => scores.add(Side::Sell, weight),
                MomentumTieBreak::Split(weight) => scores.split(weight),
            }
        }

        // Recent direction
        let up_steps = count_up_steps(&prices, cfg.direction_lookback);
        if up_steps >= cfg.bullish_up_steps {
            scores.add(Side::Buy, weights.direction);
            reasons.push((Side::Buy, text.direction_up));
        } else if up_steps <= cfg.bearish_up_steps {
            scores.add(Side::Sell, weights.direction);
            reasons.push((Side::Sell, text.direction_down));
        }

        Evaluation {
            sma_short,
            sma_long,
            rsi,
            momentum,
            trend,
            scores,
            reasons,
        }
    }

    fn to_signal(&self, evaluation: &Evaluation) -> TimeframeSignal {
        let text = &self.config.text;
        let (signal, confidence) = decide(evaluation.scores.buy_confidence());

        let reason = match signal {
            SignalAction::Hold => text.neutral.to_string(),
            SignalAction::Buy => join_reasons(&evaluation.reasons, Side::Buy, text.mixed),
            SignalAction::Sell => join_reasons(&evaluation.reasons, Side::Sell, text.mixed),
        };

        TimeframeSignal {
            signal,
            confidence: round_confidence(confidence),
            reason,
            timeframe: self.config.timeframe.clone(),
        }
    }
}

/// Count closes that rose over the previous close within the last `lookback` closes.
fn count_up_steps(prices: &[f64], lookback: usize) -> usize {
    let start = prices.len().saturating_sub(lookback);
    prices[start..].windows(2).filter(|w| w[1] > w[0]).count()
}

fn join_reasons(reasons: &[(Side, &'static str)], side: Side, fallback: &str) -> String {
    let joined = reasons
        .iter()
        .filter(|(s, _)| *s == side)
        .map(|(_, r)| *r)
        .collect::<Vec<_>>()
        .join(". ");

    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}
