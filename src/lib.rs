//! Omen - Multi-timeframe candlestick signal server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::SignalService;

/// Application state shared across handlers.
pub struct AppState<S> {
    pub config: Arc<Config>,
    pub service: Arc<SignalService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            service: self.service.clone(),
        }
    }
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use services::{SignalEngine, TimeframeSeries};
pub use types::*;
