//! Double-precision arithmetic with domain and finiteness checks.

use tracing::debug;

use super::CalcError;
use crate::types::{CalculationRequest, Operation};

// 2^53: above this every f64 is already an integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Reject inputs that can never produce a result, independent of who asks.
pub fn check_domain(req: &CalculationRequest) -> Result<(), CalcError> {
    if req.operation == Operation::Divide && req.b == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    Ok(())
}

/// Compute `a <op> b`, optionally rounded to `decimals` places.
///
/// The raw result must be finite; overflow is an error rather than an
/// infinite value leaking to the caller.
pub fn evaluate(req: &CalculationRequest, decimals: Option<u32>) -> Result<f64, CalcError> {
    check_domain(req)?;

    let CalculationRequest { a, b, operation } = *req;
    let raw = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => a / b,
    };
    debug!(a, b, op = %operation, raw, "evaluated");

    if !raw.is_finite() {
        return Err(CalcError::NonFinite);
    }

    Ok(match decimals {
        Some(places) => round_to(raw, places),
        None => raw,
    })
}

/// Round to `decimals` places to hide binary representation noise
/// (`0.1 + 0.2` becomes `0.3`). Values too large to carry that many
/// decimals are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    // Ties round toward +inf, as in the browser client, not away from zero.
    let mut whole = scaled.round();
    if whole - scaled == -0.5 {
        whole += 1.0;
    }
    let rounded = whole / factor;
    // Normalise -0.0 so callers never see "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Render a number the way the browser client prints it: plain decimals
/// in `[1e-6, 1e21)`, exponent form (`1e+21`, `1e-7`) outside it.
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        let exp = format!("{value:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        // Display never prints "-0".
        format!("{}", value + 0.0)
    }
}
