//! Converts a handler panic into the standard 500 JSON body.

use axum::response::{IntoResponse, Response};
use std::any::Any;

use crate::error::AppError;

/// `CatchPanicLayer` callback. The panic payload is logged, never returned.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".into()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
