//! HTTP route handlers.

pub mod calculate;
pub mod health;
