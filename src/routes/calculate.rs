//! POST|OPTIONS /calculate

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::auth::gate;
use crate::calculator;
use crate::error::AppError;
use crate::ocsf;
use crate::types::{CalculationResponse, Operation};

/// What we learned about the request before it finished, for the audit event.
#[derive(Default)]
struct Trail {
    operation: Option<Operation>,
    subject: Option<String>,
}

/// Validate, authorize, evaluate. Each request starts from scratch.
pub async fn calculate(
    State(state): State<Arc<crate::AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let mut trail = Trail::default();
    let outcome = match body {
        Ok(body) => process(&state, &headers, &body, &mut trail).await,
        Err(rejection) => Err(body_rejection(&rejection)),
    };

    let op = trail.operation.map_or("unknown", Operation::symbol);
    match outcome {
        Ok(resp) => {
            ocsf::calculation_event(op, 200, trail.subject.as_deref(), "Calculation succeeded");
            Json(resp).into_response()
        }
        Err(err) => {
            ocsf::calculation_event(
                op,
                err.status().as_u16(),
                trail.subject.as_deref(),
                &err.public_message(),
            );
            err.into_response()
        }
    }
}

async fn process(
    state: &crate::AppState,
    headers: &HeaderMap,
    body: &[u8],
    trail: &mut Trail,
) -> Result<CalculationResponse, AppError> {
    let value = calculator::parse_body(body)?;
    let req = calculator::validate(&value)?;
    trail.operation = Some(req.operation);

    // Division by zero is a 400 whether or not the caller is authenticated.
    calculator::check_domain(&req)?;

    let caller =
        gate::authorize(req.operation, headers, &state.jwks_cache, &state.config).await?;
    trail.subject = caller.subject().map(String::from);

    let result = calculator::evaluate(&req, state.config.result_decimals)?;

    Ok(CalculationResponse {
        result,
        operation: format!(
            "{} {} {}",
            calculator::format_number(req.a),
            req.operation,
            calculator::format_number(req.b)
        ),
    })
}

/// Axum's own rejection bodies are plain text; replace them with ours.
fn body_rejection(rejection: &BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge
    } else {
        AppError::InvalidJson
    }
}

/// CORS preflight: 200 with an empty body. Headers come from the CORS middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST or OPTIONS.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
