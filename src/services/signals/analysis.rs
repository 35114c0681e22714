//! Multi-timeframe analysis orchestrator.

use crate::services::signals::{PatternAnalyzer, TrendAnalyzer};
use crate::types::{AnalysisResult, Candle, Interval};

/// Number of hourly candles attached to the result for charting.
pub const RECENT_CANDLES: usize = 10;

/// Candles back from the latest hourly close used for the 24h change.
const DAY_LOOKBACK: usize = 24;

/// Candle series for each analyzed timeframe, ascending by open time.
#[derive(Debug, Clone, Default)]
pub struct TimeframeSeries {
    pub hourly: Vec<Candle>,
    pub one_minute: Vec<Candle>,
    pub five_minute: Vec<Candle>,
    /// Synthetic sub-minute candles, if available.
    pub sub_minute: Option<Vec<Candle>>,
}

/// Runs every analyzer over its timeframe and assembles the result.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    hourly: TrendAnalyzer,
    one_minute: TrendAnalyzer,
    five_minute: TrendAnalyzer,
    sub_minute: TrendAnalyzer,
    hourly_patterns: PatternAnalyzer,
    five_minute_patterns: Option<PatternAnalyzer>,
    sub_minute_patterns: PatternAnalyzer,
    min_sub_minute_candles: usize,
}

impl SignalEngine {
    /// Create an engine.
    ///
    /// `sub_minute_label` names the synthetic timeframe (e.g. "30 seconds").
    /// Sub-minute series shorter than `min_sub_minute_candles` are skipped.
    pub fn new(
        five_minute_patterns: bool,
        sub_minute_label: &str,
        min_sub_minute_candles: usize,
    ) -> Self {
        Self {
            hourly: TrendAnalyzer::standard(),
            one_minute: TrendAnalyzer::fast(Interval::OneMinute.label()),
            five_minute: TrendAnalyzer::fast(Interval::FiveMinutes.label()),
            sub_minute: TrendAnalyzer::fast(sub_minute_label),
            hourly_patterns: PatternAnalyzer::new(Interval::OneHour.label()),
            five_minute_patterns: five_minute_patterns
                .then(|| PatternAnalyzer::new(Interval::FiveMinutes.label())),
            sub_minute_patterns: PatternAnalyzer::new(sub_minute_label),
            min_sub_minute_candles: min_sub_minute_candles.max(1),
        }
    }

    /// Analyze all timeframes for `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if the hourly, one-minute or five-minute series is empty.
    pub fn analyze(&self, symbol: &str, series: &TimeframeSeries) -> AnalysisResult {
        let hourly_candles = &series.hourly;
        assert!(!hourly_candles.is_empty(), "hourly series must not be empty");

        let (hourly, indicators) = self.hourly.analyze_with_indicators(hourly_candles);
        let short_term_signal = self.one_minute.analyze(&series.one_minute);
        let five_min_signal = self.five_minute.analyze(&series.five_minute);
        let pattern_signal = self.hourly_patterns.analyze(hourly_candles);
        let five_min_pattern_signal = self
            .five_minute_patterns
            .as_ref()
            .map(|analyzer| analyzer.analyze(&series.five_minute));

        let sub_minute = series
            .sub_minute
            .as_deref()
            .filter(|candles| candles.len() >= self.min_sub_minute_candles);
        let sub_minute_signal = sub_minute.map(|candles| self.sub_minute.analyze(candles));
        let sub_minute_pattern_signal =
            sub_minute.map(|candles| self.sub_minute_patterns.analyze(candles));

        let (current_price, price_change_24h, price_change_percent_24h) =
            day_change(hourly_candles);

        let recent_start = hourly_candles.len().saturating_sub(RECENT_CANDLES);

        AnalysisResult {
            symbol: symbol.to_string(),
            current_price,
            price_change_24h,
            price_change_percent_24h,
            hourly,
            indicators,
            recent_candles: hourly_candles[recent_start..].to_vec(),
            short_term_signal,
            five_min_signal,
            pattern_signal,
            five_min_pattern_signal,
            sub_minute_signal,
            sub_minute_pattern_signal,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(true, "30 seconds", 5)
    }
}

/// Latest close, absolute change and percent change against the close 24
/// candles back (or the first close when the series is shorter).
fn day_change(hourly: &[Candle]) -> (f64, f64, f64) {
    let current = hourly[hourly.len() - 1].close;
    let reference = if hourly.len() >= DAY_LOOKBACK {
        hourly[hourly.len() - DAY_LOOKBACK].close
    } else {
        hourly[0].close
    };

    let change = current - reference;
    (current, change, change / reference * 100.0)
}
