pub mod health;
pub mod signals;

use crate::sources::CandleSource;
use crate::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router.
pub fn router<S: CandleSource + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(health::router::<S>())
        .nest("/api/signals", signals::router::<S>())
}

/// Build the full application with CORS and request tracing.
pub fn app<S: CandleSource + 'static>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router::<S>()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
