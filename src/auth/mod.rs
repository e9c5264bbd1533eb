//! Bearer-token authorization for protected operations.

pub mod gate;
pub mod jwt;
