//! Turns an arbitrary request body into a `CalculationRequest`.

use serde_json::Value;

use crate::error::AppError;
use crate::types::{CalculationRequest, Operation};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("body is not a JSON object")]
    NotAnObject,

    #[error("operand `{0}` is missing or not a number")]
    InvalidOperand(&'static str),

    #[error("operation is missing or unsupported")]
    InvalidOperation,
}

impl From<ValidationError> for AppError {
    fn from(_: ValidationError) -> Self {
        AppError::InvalidParameters
    }
}

/// Parse the raw body as JSON. An empty body reads as `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|_| AppError::InvalidJson)
}

/// Check shape and types. Numeric strings, null, arrays and unknown
/// operators are all rejected; extra fields are ignored.
pub fn validate(body: &Value) -> Result<CalculationRequest, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let a = operand(obj.get("a"), "a")?;
    let b = operand(obj.get("b"), "b")?;
    let operation = obj
        .get("operation")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Operation>().ok())
        .ok_or(ValidationError::InvalidOperation)?;

    Ok(CalculationRequest { a, b, operation })
}

fn operand(value: Option<&Value>, name: &'static str) -> Result<f64, ValidationError> {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ValidationError::InvalidOperand(name)),
        _ => Err(ValidationError::InvalidOperand(name)),
    }
}
