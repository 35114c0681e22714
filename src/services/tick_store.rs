//! Sub-minute candle synthesis from polled prices.

use crate::sources::CandleSource;
use crate::types::Candle;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// OHLC bucket for one sub-minute period.
#[derive(Debug, Clone)]
struct TickBucket {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl TickBucket {
    fn new(time: i64, price: f64, volume: Option<f64>) -> Self {
        Self {
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: volume.unwrap_or(0.0),
        }
    }

    fn update(&mut self, price: f64, volume: Option<f64>) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        if let Some(v) = volume {
            self.volume += v;
        }
    }

    fn to_candle(&self, bucket_ms: i64) -> Candle {
        Candle {
            open_time: self.time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            close_time: Some(self.time + bucket_ms - 1),
        }
    }
}

/// Rolling bucket series for one symbol.
#[derive(Debug)]
struct TickSeries {
    buckets: VecDeque<TickBucket>,
}

impl TickSeries {
    fn new(capacity: usize) -> Self {
        Self {
            buckets: VecDeque::with_capacity(capacity),
        }
    }
}

/// Per-symbol store of synthetic sub-minute candles.
pub struct TickStore {
    data: DashMap<String, TickSeries>,
    bucket_ms: i64,
    max_candles: usize,
}

impl TickStore {
    /// Create a store with `bucket_secs`-wide candles, keeping the last `max_candles`.
    pub fn new(bucket_secs: u64, max_candles: usize) -> Arc<Self> {
        Arc::new(Self {
            data: DashMap::new(),
            bucket_ms: bucket_secs.max(1) as i64 * 1000,
            max_candles: max_candles.max(1),
        })
    }

    /// Bucket width in seconds.
    pub fn bucket_secs(&self) -> u64 {
        (self.bucket_ms / 1000) as u64
    }

    /// Human readable timeframe label for the buckets.
    pub fn label(&self) -> String {
        let secs = self.bucket_secs();
        if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{} seconds", secs)
        }
    }

    /// Fold a price observation into the symbol's current bucket.
    ///
    /// Observations older than the current bucket are dropped so the series
    /// stays strictly ordered.
    pub fn add_price(&self, symbol: &str, price: f64, volume: Option<f64>, timestamp_ms: i64) {
        if !price.is_finite() || price <= 0.0 {
            return;
        }

        let bucket_time = timestamp_ms.div_euclid(self.bucket_ms) * self.bucket_ms;
        let mut entry = self
            .data
            .entry(symbol.to_uppercase())
            .or_insert_with(|| TickSeries::new(self.max_candles));
        let series = entry.value_mut();

        if let Some(last) = series.buckets.back_mut() {
            if last.time == bucket_time {
                last.update(price, volume);
                return;
            }
            if bucket_time < last.time {
                return;
            }
        }

        series
            .buckets
            .push_back(TickBucket::new(bucket_time, price, volume));
        while series.buckets.len() > self.max_candles {
            series.buckets.pop_front();
        }
    }

    /// Candles for a symbol, oldest first. Includes the bucket still forming.
    pub fn candles(&self, symbol: &str) -> Vec<Candle> {
        match self.data.get(&symbol.to_uppercase()) {
            Some(series) => series
                .buckets
                .iter()
                .map(|b| b.to_candle(self.bucket_ms))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of symbols with data.
    pub fn symbol_count(&self) -> usize {
        self.data.len()
    }
}

/// Polls spot prices for tracked symbols and feeds them into a [`TickStore`].
pub struct TickPoller<S> {
    source: Arc<S>,
    store: Arc<TickStore>,
    symbols: Vec<String>,
    interval: Duration,
}

impl<S: CandleSource> TickPoller<S> {
    pub fn new(
        source: Arc<S>,
        store: Arc<TickStore>,
        symbols: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            symbols,
            interval,
        }
    }

    /// Poll forever.
    pub async fn start_polling(&self) {
        info!(
            "Starting tick polling for {} symbols every {}ms",
            self.symbols.len(),
            self.interval.as_millis()
        );

        loop {
            self.poll_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Fetch one price per symbol. Returns how many were stored.
    pub async fn poll_once(&self) -> usize {
        let mut stored = 0;
        for symbol in &self.symbols {
            match self.source.fetch_price(symbol).await {
                Ok(price) => {
                    let timestamp = chrono::Utc::now().timestamp_millis();
                    self.store.add_price(symbol, price, None, timestamp);
                    stored += 1;
                }
                Err(e) => warn!("Tick poll failed for {}: {}", symbol, e),
            }
        }
        debug!("Tick poll stored {}/{} prices", stored, self.symbols.len());
        stored
    }
}
