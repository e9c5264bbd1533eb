//! Auth calculator: arithmetic API whose `*` and `/` operations require a
//! bearer token issued by an external identity provider.
//!
//! Same Axum router runs in both Lambda and local dev contexts.
//! Detection via `AWS_LAMBDA_RUNTIME_API` env var.

pub mod auth;
pub mod calculator;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod ocsf;
pub mod routes;
pub mod types;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwksCache;
use crate::config::Config;

/// Shared application state available to all route handlers.
///
/// Nothing here changes per request except the JWKS cache contents.
pub struct AppState {
    pub config: Config,
    pub jwks_cache: Arc<JwksCache>,
}

/// Build the Axum router with all middleware and routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let allow_origin = middleware::cors::allow_origin_header(&state.config.cors_allow_origin);

    let calculate = post(routes::calculate::calculate)
        .options(routes::calculate::preflight)
        .fallback(routes::calculate::method_not_allowed);

    Router::new()
        .route("/health", get(routes::health::health))
        .route(&state.config.calculate_path, calculate)
        .layer(CatchPanicLayer::custom(middleware::panic::panic_response))
        .layer(from_fn(move |req, next| {
            let origin = allow_origin.clone();
            middleware::cors::apply_cors(origin, req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
