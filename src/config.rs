use std::env;
use std::time::Duration;

use crate::sources::BINANCE_API_URL;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Binance REST base URL.
    pub binance_api_url: String,
    /// Binance API key (optional, public endpoints work without it).
    pub binance_api_key: Option<String>,
    /// Symbol served by `GET /api/signals`.
    pub default_symbol: String,
    /// Symbols polled for sub-minute candles.
    pub tracked_symbols: Vec<String>,
    /// How long an analysis result is served from cache.
    pub cache_ttl_ms: u64,
    /// Attempts per upstream request when rate limited.
    pub fetch_retries: u32,
    /// Initial backoff after a rate-limited request, doubled per retry.
    pub retry_delay_ms: u64,
    /// Hourly candles fetched per analysis.
    pub hourly_limit: u32,
    /// One-minute candles fetched per analysis.
    pub minute_limit: u32,
    /// Five-minute candles fetched per analysis.
    pub five_min_limit: u32,
    /// Whether to run the pattern analyzer on the five-minute series.
    pub five_min_patterns: bool,
    /// Width of synthetic sub-minute candles.
    pub sub_minute_bucket_secs: u64,
    /// Sub-minute candles kept per symbol.
    pub sub_minute_max_candles: usize,
    /// Sub-minute candles required before they are analyzed.
    pub min_sub_minute_candles: usize,
    /// Tick polling interval (0 = disabled).
    pub tick_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            binance_api_url: BINANCE_API_URL.to_string(),
            binance_api_key: None,
            default_symbol: "BTCUSDT".to_string(),
            tracked_symbols: vec!["BTCUSDT".to_string()],
            cache_ttl_ms: 2000,
            fetch_retries: 3,
            retry_delay_ms: 500,
            hourly_limit: 100,
            minute_limit: 30,
            five_min_limit: 30,
            five_min_patterns: true,
            sub_minute_bucket_secs: 30,
            sub_minute_max_candles: 20,
            min_sub_minute_candles: 5,
            tick_poll_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let default_symbol = parse("DEFAULT_SYMBOL")
            .map(|s| s.to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_symbol);

        // Format: "BTCUSDT,ETHUSDT"
        let tracked_symbols = parse("TRACKED_SYMBOLS")
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or_else(|| vec![default_symbol.clone()]);

        Self {
            host: parse("HOST").unwrap_or(defaults.host),
            port: parse("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            binance_api_url: parse("BINANCE_API_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.binance_api_url),
            binance_api_key: parse("BINANCE_API_KEY").filter(|s| !s.is_empty()),
            default_symbol,
            tracked_symbols,
            cache_ttl_ms: parse("CACHE_TTL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_ms),
            fetch_retries: parse("FETCH_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_retries),
            retry_delay_ms: parse("RETRY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
            hourly_limit: parse("HOURLY_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hourly_limit),
            minute_limit: parse("MINUTE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.minute_limit),
            five_min_limit: parse("FIVE_MIN_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.five_min_limit),
            five_min_patterns: parse("FIVE_MIN_PATTERNS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.five_min_patterns),
            sub_minute_bucket_secs: parse("SUB_MINUTE_BUCKET_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sub_minute_bucket_secs),
            sub_minute_max_candles: parse("SUB_MINUTE_MAX_CANDLES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sub_minute_max_candles),
            min_sub_minute_candles: parse("MIN_SUB_MINUTE_CANDLES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_sub_minute_candles),
            tick_poll_ms: parse("TICK_POLL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tick_poll_ms),
        }
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Initial retry backoff as a duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Tick polling interval, or `None` when polling is disabled.
    pub fn tick_poll_interval(&self) -> Option<Duration> {
        (self.tick_poll_ms > 0).then(|| Duration::from_millis(self.tick_poll_ms))
    }
}
