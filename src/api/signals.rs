//! Signal API endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::sources::CandleSource;
use crate::types::AnalysisResult;
use crate::AppState;

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Serialize)]
pub struct ApiMeta {
    pub cached: bool,
}

impl<T> ApiResponse<T> {
    fn new(data: T, cached: bool) -> Self {
        Self {
            data,
            meta: ApiMeta { cached },
        }
    }
}

/// Create the signals router.
pub fn router<S: CandleSource + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(get_default_signals::<S>))
        .route("/:symbol", get(get_signals::<S>))
}

/// Analysis for the configured default symbol.
async fn get_default_signals<S: CandleSource + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ApiResponse<AnalysisResult>>> {
    let symbol = state.config.default_symbol.clone();
    analyze(&state, &symbol).await
}

/// Analysis for a symbol.
async fn get_signals<S: CandleSource + 'static>(
    State(state): State<AppState<S>>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<AnalysisResult>>> {
    let symbol = normalize_symbol(&symbol)?;
    analyze(&state, &symbol).await
}

async fn analyze<S: CandleSource + 'static>(
    state: &AppState<S>,
    symbol: &str,
) -> Result<Json<ApiResponse<AnalysisResult>>> {
    let (result, cached) = state.service.get_analysis(symbol).await.map_err(|e| {
        tracing::error!("Analysis failed for {}: {}", symbol, e);
        e
    })?;
    Ok(Json(ApiResponse::new(result, cached)))
}

/// Uppercase a trading pair and reject anything that is not alphanumeric.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!("Invalid symbol: {}", symbol)));
    }
    Ok(symbol.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::SignalService;
    use crate::types::{Candle, Interval};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubSource {
        fail: bool,
    }

    impl CandleSource for StubSource {
        async fn fetch_candles(
            &self,
            _symbol: &str,
            interval: Interval,
            limit: u32,
        ) -> Result<Vec<Candle>> {
            if self.fail {
                return Err(AppError::UpstreamUnavailable(
                    "Rate limited by Binance API. Please wait a moment and try again.".to_string(),
                ));
            }
            let step = interval.millis();
            Ok((0..limit as i64)
                .map(|i| Candle {
                    open_time: i * step,
                    open: 200.0 - i as f64,
                    high: 200.5 - i as f64,
                    low: 199.0 - i as f64,
                    close: 199.5 - i as f64,
                    volume: 1.0,
                    close_time: Some(i * step + step - 1),
                })
                .collect())
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<f64> {
            Ok(100.0)
        }
    }

    fn app(fail: bool) -> Router {
        let config = Arc::new(Config::default());
        let service = SignalService::from_config(&config, Arc::new(StubSource { fail }), None);
        crate::api::app(AppState {
            config,
            service: Arc::new(service),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // =========================================================================
    // Symbol Validation Tests
    // =========================================================================

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("btcusdt").unwrap(), "BTCUSDT");
        assert_eq!(normalize_symbol(" EthUsdt ").unwrap(), "ETHUSDT");
        assert!(matches!(
            normalize_symbol("BTC-USDT"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(normalize_symbol(""), Err(AppError::BadRequest(_))));
    }

    // =========================================================================
    // Handler Tests
    // =========================================================================

    #[tokio::test]
    async fn test_default_symbol_route() {
        let (status, body) = get_json(app(false), "/api/signals").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "BTCUSDT");
        assert_eq!(body["data"]["signal"], "SELL");
        assert_eq!(body["meta"]["cached"], false);
    }

    #[tokio::test]
    async fn test_symbol_route_uppercases() {
        let (status, body) = get_json(app(false), "/api/signals/ethusdt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "ETHUSDT");
        assert!(body["data"]["recentCandles"].is_array());
        assert!(body["data"]["patternSignal"]["patterns"].is_array());
    }

    #[tokio::test]
    async fn test_second_request_is_cached() {
        let app = app(false);
        get_json(app.clone(), "/api/signals/BTCUSDT").await;
        let (_, body) = get_json(app, "/api/signals/BTCUSDT").await;
        assert_eq!(body["meta"]["cached"], true);
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_bad_request() {
        let (status, body) = get_json(app(false), "/api/signals/BTC%24USDT").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (status, body) = get_json(app(true), "/api/signals/BTCUSDT").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["error"],
            "Rate limited by Binance API. Please wait a moment and try again."
        );
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = get_json(app(false), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
