use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// The market-data source kept failing or rate limiting after all retries.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The market-data source returned candles that break the series invariants.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedInput(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Reqwest(_) => StatusCode::BAD_GATEWAY,
            AppError::SerdeJson(_) => StatusCode::BAD_GATEWAY,
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::UpstreamUnavailable(msg)
            | AppError::MalformedInput(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Reqwest(e) => e.to_string(),
            AppError::SerdeJson(e) => e.to_string(),
            AppError::Anyhow(e) => e.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
