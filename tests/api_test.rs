//! Integration tests for API endpoints
//!
//! The router is driven in-process with an in-memory candle source. The
//! `live_` test talks to the real Binance API and is ignored by default:
//!
//! Run with: cargo test --test api_test -- --ignored --nocapture

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use omen::config::Config;
use omen::services::SignalService;
use omen::sources::{BinanceClient, CandleSource};
use omen::{api, AppState, Candle, Interval, Result};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct Sawtooth;

impl CandleSource for Sawtooth {
    async fn fetch_candles(
        &self,
        _symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<Candle>> {
        let step = interval.millis();
        Ok((0..limit as i64)
            .map(|i| {
                let close = 100.0 + (i % 4) as f64;
                Candle {
                    open_time: i * step,
                    open: close - 0.25,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 2.0,
                    close_time: Some(i * step + step - 1),
                }
            })
            .collect())
    }

    async fn fetch_price(&self, _symbol: &str) -> Result<f64> {
        Ok(101.0)
    }
}

fn app<S: CandleSource + 'static>(source: S) -> Router {
    let config = Arc::new(Config::default());
    let service = SignalService::from_config(&config, Arc::new(source), None);
    api::app(AppState {
        config,
        service: Arc::new(service),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_response_structure() {
    let (status, body) = get(app(Sawtooth), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_signals_response_structure() {
    let (status, body) = get(app(Sawtooth), "/api/signals/solusdt").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["symbol"], "SOLUSDT");
    assert!(["BUY", "SELL", "HOLD"].contains(&data["signal"].as_str().unwrap()));
    assert!(data["confidence"].as_u64().unwrap() <= 100);
    assert_eq!(data["recentCandles"].as_array().unwrap().len(), 10);
    for key in ["shortTermSignal", "fiveMinSignal", "patternSignal"] {
        assert!(data[key]["reason"].is_string(), "missing {}", key);
    }
    assert!(data["timestamp"].is_i64());
    assert_eq!(body["meta"]["cached"], false);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let response = app(Sawtooth)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(Sawtooth)
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn live_binance_analysis() {
    let client = BinanceClient::new(
        omen::sources::BINANCE_API_URL,
        None,
        3,
        Duration::from_millis(500),
    );
    let (status, body) = get(app(client), "/api/signals/BTCUSDT").await;
    println!("{}", serde_json::to_string_pretty(&body).unwrap());
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["currentPrice"].as_f64().unwrap() > 0.0);
}
