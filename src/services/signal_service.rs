use crate::config::Config;
use crate::error::Result;
use crate::services::signals::{SignalEngine, TimeframeSeries};
use crate::services::{Cache, TickStore};
use crate::sources::CandleSource;
use crate::types::{AnalysisResult, Interval};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Candle counts fetched per timeframe.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub hourly: u32,
    pub one_minute: u32,
    pub five_minute: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            hourly: 100,
            one_minute: 30,
            five_minute: 30,
        }
    }
}

/// Fetches candles, runs the signal engine and caches the result per symbol.
pub struct SignalService<S> {
    source: Arc<S>,
    engine: SignalEngine,
    cache: Cache<AnalysisResult>,
    cache_ttl: Duration,
    limits: FetchLimits,
    ticks: Option<Arc<TickStore>>,
}

impl<S: CandleSource> SignalService<S> {
    pub fn new(
        source: Arc<S>,
        engine: SignalEngine,
        cache_ttl: Duration,
        limits: FetchLimits,
        ticks: Option<Arc<TickStore>>,
    ) -> Self {
        Self {
            source,
            engine,
            cache: Cache::new(),
            cache_ttl,
            limits,
            ticks,
        }
    }

    /// Build a service from configuration.
    pub fn from_config(config: &Config, source: Arc<S>, ticks: Option<Arc<TickStore>>) -> Self {
        let label = ticks
            .as_ref()
            .map(|t| t.label())
            .unwrap_or_else(|| format!("{} seconds", config.sub_minute_bucket_secs));
        let engine = SignalEngine::new(
            config.five_min_patterns,
            &label,
            config.min_sub_minute_candles,
        );
        let limits = FetchLimits {
            hourly: config.hourly_limit,
            one_minute: config.minute_limit,
            five_minute: config.five_min_limit,
        };

        Self::new(source, engine, config.cache_ttl(), limits, ticks)
    }

    /// Analysis for `symbol`, and whether it came from cache.
    pub async fn get_analysis(&self, symbol: &str) -> Result<(AnalysisResult, bool)> {
        if let Some(result) = self.cache.get_fresh(symbol, self.cache_ttl) {
            debug!("Returning cached analysis for {}", symbol);
            return Ok((result, true));
        }

        let (hourly, one_minute, five_minute) = tokio::try_join!(
            self.source
                .fetch_candles(symbol, Interval::OneHour, self.limits.hourly),
            self.source
                .fetch_candles(symbol, Interval::OneMinute, self.limits.one_minute),
            self.source
                .fetch_candles(symbol, Interval::FiveMinutes, self.limits.five_minute),
        )?;

        let sub_minute = self
            .ticks
            .as_ref()
            .map(|store| store.candles(symbol))
            .filter(|candles| !candles.is_empty());

        let series = TimeframeSeries {
            hourly,
            one_minute,
            five_minute,
            sub_minute,
        };
        let result = self.engine.analyze(symbol, &series);

        info!(
            "{} analysis: {} ({}%), price {:.2}",
            symbol, result.hourly.signal, result.hourly.confidence, result.current_price
        );

        self.cache.set(symbol.to_string(), result.clone());
        Ok((result, false))
    }

    /// Drop cached results older than the cache TTL.
    pub fn evict_stale(&self) {
        let before = self.cache.len();
        self.cache.cleanup(self.cache_ttl);
        let evicted = before.saturating_sub(self.cache.len());
        if evicted > 0 {
            debug!("Evicted {} stale analyses", evicted);
        }
    }

    /// Number of cached results, including stale ones.
    pub fn cached_symbols(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::types::{Candle, SignalAction};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeSource {
        calls: AtomicU32,
        fail_minute: bool,
    }

    impl FakeSource {
        fn new(fail_minute: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail_minute,
            })
        }
    }

    impl CandleSource for FakeSource {
        async fn fetch_candles(
            &self,
            _symbol: &str,
            interval: Interval,
            limit: u32,
        ) -> Result<Vec<Candle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_minute && interval == Interval::OneMinute {
                return Err(AppError::UpstreamUnavailable(
                    "Binance API error (minute): 500".to_string(),
                ));
            }
            let step = interval.millis();
            Ok((0..limit)
                .map(|i| {
                    let close = 100.0 + i as f64;
                    Candle {
                        open_time: i as i64 * step,
                        open: close - 0.5,
                        high: close + 0.5,
                        low: close - 1.0,
                        close,
                        volume: 5.0,
                        close_time: Some(i as i64 * step + step - 1),
                    }
                })
                .collect())
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<f64> {
            Ok(100.0)
        }
    }

    fn service(
        source: Arc<FakeSource>,
        ttl: Duration,
        ticks: Option<Arc<TickStore>>,
    ) -> SignalService<FakeSource> {
        SignalService::new(
            source,
            SignalEngine::default(),
            ttl,
            FetchLimits::default(),
            ticks,
        )
    }

    // =========================================================================
    // Pipeline Tests
    // =========================================================================

    #[tokio::test]
    async fn test_get_analysis_fetches_all_timeframes() {
        let source = FakeSource::new(false);
        let svc = service(source.clone(), Duration::from_secs(60), None);

        let (result, cached) = svc.get_analysis("BTCUSDT").await.unwrap();
        assert!(!cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.symbol, "BTCUSDT");
        assert_eq!(result.current_price, 199.0);
        assert_eq!(result.hourly.signal, SignalAction::Buy);
        assert!(result.sub_minute_signal.is_none());
    }

    #[tokio::test]
    async fn test_get_analysis_serves_fresh_cache() {
        let source = FakeSource::new(false);
        let svc = service(source.clone(), Duration::from_secs(60), None);

        let (first, _) = svc.get_analysis("BTCUSDT").await.unwrap();
        let (second, cached) = svc.get_analysis("BTCUSDT").await.unwrap();
        assert!(cached);
        assert_eq!(second.timestamp, first.timestamp);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(svc.cached_symbols(), 1);
    }

    #[tokio::test]
    async fn test_get_analysis_refetches_stale_cache() {
        let source = FakeSource::new(false);
        let svc = service(source.clone(), Duration::ZERO, None);

        svc.get_analysis("BTCUSDT").await.unwrap();
        let (_, cached) = svc.get_analysis("BTCUSDT").await.unwrap();
        assert!(!cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_evict_stale_drops_expired_results() {
        let source = FakeSource::new(false);
        let svc = service(source.clone(), Duration::from_millis(40), None);

        svc.get_analysis("BTCUSDT").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        svc.get_analysis("ETHUSDT").await.unwrap();

        svc.evict_stale();
        assert_eq!(svc.cached_symbols(), 1);
        let (_, cached) = svc.get_analysis("ETHUSDT").await.unwrap();
        assert!(cached);
    }

    #[tokio::test]
    async fn test_get_analysis_caches_per_symbol() {
        let source = FakeSource::new(false);
        let svc = service(source.clone(), Duration::from_secs(60), None);

        svc.get_analysis("BTCUSDT").await.unwrap();
        let (result, cached) = svc.get_analysis("ETHUSDT").await.unwrap();
        assert!(!cached);
        assert_eq!(result.symbol, "ETHUSDT");
        assert_eq!(svc.cached_symbols(), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates_and_is_not_cached() {
        let source = FakeSource::new(true);
        let svc = service(source, Duration::from_secs(60), None);

        let err = svc.get_analysis("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(svc.cached_symbols(), 0);
    }

    #[tokio::test]
    async fn test_sub_minute_series_is_attached() {
        let ticks = TickStore::new(30, 20);
        for i in 0..6 {
            ticks.add_price("BTCUSDT", 100.0 + i as f64, None, i * 30_000);
        }
        let svc = service(FakeSource::new(false), Duration::from_secs(60), Some(ticks));

        let (result, _) = svc.get_analysis("BTCUSDT").await.unwrap();
        let signal = result.sub_minute_signal.expect("sub-minute signal");
        assert_eq!(signal.timeframe, "30 seconds");
        assert!(result.sub_minute_pattern_signal.is_some());
    }

    #[test]
    fn test_from_config_uses_limits() {
        let config = Config {
            hourly_limit: 48,
            ..Config::default()
        };
        let source = FakeSource::new(false);
        let svc = SignalService::from_config(&config, source.clone(), None);

        let (result, _) = tokio_test::block_on(svc.get_analysis("BTCUSDT")).unwrap();
        assert_eq!(result.current_price, 147.0);
        assert_eq!(result.recent_candles.len(), 10);
    }
}
