//! Bazaar storefront library.
//!
//! This crate provides the storefront API as a library, allowing it to be
//! tested in-process and reused by tools.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, http::Request, middleware as axum_middleware};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Wrap `routes` in the request ID, tracing and CORS layers and attach state.
pub fn build_router(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
