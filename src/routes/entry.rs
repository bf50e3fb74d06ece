use std::sync::Arc;

use axum::{
    Router,
    http::{Method, Uri},
    middleware,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    middleware::{catch_panic_layer, cors_layer, error_envelope_middleware},
    state::AppState,
};

use super::{health, tasks};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .merge(tasks::router(state))
        .fallback(route_not_found)
}

/// The full service: routes plus the error envelope, panic, CORS and trace layers.
pub fn app(state: Arc<AppState>) -> Router {
    with_layers(router(state.clone()), &state)
}

pub fn with_layers(router: Router, state: &AppState) -> Router {
    router
        .layer(catch_panic_layer())
        .layer(middleware::from_fn_with_state(
            state.environment(),
            error_envelope_middleware,
        ))
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("Route {method} {} not found", uri.path()))
}
