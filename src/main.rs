//! Dual-mode entrypoint: Lambda or local dev server.
//!
//! Detects Lambda runtime via `AWS_LAMBDA_RUNTIME_API` env var.
//! - Lambda: `lambda_http::run(app)`, API Gateway / function URL events
//! - Local: `axum::serve(listener, app)` on a TCP listener

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use auth_calculator::auth::jwt::JwksCache;
use auth_calculator::config::Config;
use auth_calculator::{create_app, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let is_lambda = env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

    // Init tracing: JSON for Lambda, pretty for local
    if is_lambda {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        // Load .env for local dev
        let _ = dotenvy::dotenv();
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let http_client = match reqwest::Client::builder()
        .timeout(config.jwks_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let jwks_cache = Arc::new(JwksCache::from_config(http_client, &config));

    tracing::info!(
        issuer = %config.auth_issuer,
        audience = %config.auth_audience,
        path = %config.calculate_path,
        "Calculator configured"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        jwks_cache,
    });

    let app = create_app(state);

    if is_lambda {
        tracing::info!("Starting in Lambda mode");
        if let Err(e) = lambda_http::run(app).await {
            tracing::error!("Lambda runtime error: {}", e);
            return ExitCode::FAILURE;
        }
    } else {
        let addr = format!("0.0.0.0:{}", config.port);
        tracing::info!("Starting local server on {}", addr);
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to bind {}: {}", addr, e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
