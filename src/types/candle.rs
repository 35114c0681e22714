use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Kline interval supported by the signal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl Interval {
    /// Exchange interval code.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::OneHour => "1h",
        }
    }

    /// Human readable label used as a signal timeframe.
    pub fn label(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1 minute",
            Interval::FiveMinutes => "5 minutes",
            Interval::OneHour => "1 hour",
        }
    }

    /// Bucket length in milliseconds.
    pub fn millis(&self) -> i64 {
        match self {
            Interval::OneMinute => 60_000,
            Interval::FiveMinutes => 300_000,
            Interval::OneHour => 3_600_000,
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Open time in epoch milliseconds. Series key.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<i64>,
}

impl Candle {
    /// Absolute body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Check the per-candle price invariants.
    fn check(&self) -> std::result::Result<(), String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(format!("candle {} has a non-positive price", self.open_time));
        }
        if !(self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high) {
            return Err(format!(
                "candle {} violates low <= open/close <= high",
                self.open_time
            ));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(format!("candle {} has a negative volume", self.open_time));
        }
        if let Some(close_time) = self.close_time {
            if close_time < self.open_time {
                return Err(format!("candle {} closes before it opens", self.open_time));
            }
        }
        Ok(())
    }
}

/// Reject a series that breaks the candle invariants.
///
/// Open times must be strictly increasing, which also rules out duplicates.
/// This runs where raw exchange data enters the process; the analyzers assume
/// validated input.
pub fn validate_series(candles: &[Candle]) -> Result<()> {
    for candle in candles {
        candle.check().map_err(AppError::MalformedInput)?;
    }

    if let Some(pair) = candles
        .windows(2)
        .find(|pair| pair[1].open_time <= pair[0].open_time)
    {
        return Err(AppError::MalformedInput(format!(
            "open times not strictly increasing at {} -> {}",
            pair[0].open_time, pair[1].open_time
        )));
    }

    Ok(())
}

/// Closing-price projection of a series.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
