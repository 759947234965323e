//! Route modules for the Ledger sync server

pub mod collections;
pub mod health;
pub mod settings;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router, middleware included
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(collections::router())
        .merge(settings::router());

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        // Layers run bottom-up on the way in: CORS, tracing, request
        // context, then the content-type gate
        .layer(middleware::from_fn(crate::middleware::require_json))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::request_context,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
