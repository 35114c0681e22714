use crate::error::{AppError, Result};
use crate::types::{validate_series, Candle, Interval};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

const RATE_LIMITED: &str = "Rate limited by Binance API. Please wait a moment and try again.";

/// A provider of candle series and spot prices.
pub trait CandleSource: Send + Sync {
    /// Fetch the latest `limit` candles for `symbol`, ascending by open time.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// Fetch the latest traded price for `symbol`.
    fn fetch_price(&self, symbol: &str) -> impl Future<Output = Result<f64>> + Send;
}

/// Binance spot ticker price response.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

/// Binance REST client.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
    retry_delay: Duration,
}

impl BinanceClient {
    /// Create a new Binance client.
    ///
    /// Rate-limited requests are retried up to `retries` times, sleeping
    /// `retry_delay` before the first retry and doubling after each.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        retries: u32,
        retry_delay: Duration,
    ) -> Self {
        let client = Client::builder()
            .user_agent("Omen/1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            retries: retries.max(1),
            retry_delay,
        }
    }

    async fn get_with_retry(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut delay = self.retry_delay;

        for attempt in 1..=self.retries {
            let mut request = self.client.get(&url).query(query);
            if let Some(ref key) = self.api_key {
                request = request.header("X-MBX-APIKEY", key);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    "Binance rate limited ({}), waiting {}ms before retry {}/{}",
                    context,
                    delay.as_millis(),
                    attempt,
                    self.retries
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                warn!(
                    "Binance API returned {} ({}): {}",
                    status,
                    context,
                    text.chars().take(200).collect::<String>()
                );
                return Err(AppError::UpstreamUnavailable(format!(
                    "Binance API error ({}): {}",
                    context,
                    status.as_u16()
                )));
            }

            return Ok(response);
        }

        Err(AppError::UpstreamUnavailable(RATE_LIMITED.to_string()))
    }
}

impl CandleSource for BinanceClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<Candle>> {
        let context = series_name(interval);
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.code().to_string()),
            ("limit", limit.to_string()),
        ];

        let body = self
            .get_with_retry("/klines", &query, context)
            .await?
            .text()
            .await?;
        let candles = parse_klines(&body, context)?;

        debug!(
            "Fetched {} {} candles for {}",
            candles.len(),
            interval,
            symbol
        );
        Ok(candles)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        let query = [("symbol", symbol.to_string())];
        let ticker: TickerPrice = self
            .get_with_retry("/ticker/price", &query, "ticker")
            .await?
            .json()
            .await?;

        let price = ticker
            .price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                AppError::MalformedInput(format!(
                    "invalid ticker price for {}: {}",
                    ticker.symbol, ticker.price
                ))
            })?;

        debug!("Binance price update: {} = ${}", ticker.symbol, price);
        Ok(price)
    }
}

/// Name of a series in error messages.
fn series_name(interval: Interval) -> &'static str {
    match interval {
        Interval::OneHour => "hourly",
        Interval::OneMinute => "minute",
        Interval::FiveMinutes => "5min",
    }
}

/// Parse a raw kline response body.
///
/// Each row is `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
/// The series is validated before it is returned and must not be empty.
pub fn parse_klines(body: &str, context: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    if rows.is_empty() {
        return Err(AppError::MalformedInput(format!(
            "Binance returned no klines ({})",
            context
        )));
    }

    let candles = rows
        .iter()
        .map(|row| parse_kline(row))
        .collect::<std::result::Result<Vec<_>, String>>()
        .map_err(|e| AppError::MalformedInput(format!("{} ({})", e, context)))?;

    validate_series(&candles)?;
    Ok(candles)
}

fn parse_kline(row: &[Value]) -> std::result::Result<Candle, String> {
    if row.len() < 6 {
        return Err(format!("kline row has {} fields, expected at least 6", row.len()));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| format!("invalid kline open time: {}", row[0]))?;

    Ok(Candle {
        open_time,
        open: number(&row[1], "open")?,
        high: number(&row[2], "high")?,
        low: number(&row[3], "low")?,
        close: number(&row[4], "close")?,
        volume: number(&row[5], "volume")?,
        close_time: row.get(6).and_then(Value::as_i64),
    })
}

/// Read a kline field that may be encoded as a string or a number.
fn number(value: &Value, field: &str) -> std::result::Result<f64, String> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| format!("invalid kline {}: {}", field, value))
}
