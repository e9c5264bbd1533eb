//! Calculation core: input validation and arithmetic evaluation.
//!
//! Both halves are pure functions; no state survives between requests.

pub mod evaluate;
pub mod validate;

pub use evaluate::{check_domain, evaluate, format_number, round_to};
pub use validate::{parse_body, validate, ValidationError};

/// Arithmetic domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not finite")]
    NonFinite,
}
