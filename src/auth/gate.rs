//! Decides whether a calculation may proceed for the given caller.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use super::jwt::{verify_token, Claims, JwksCache, JwtError};
use crate::config::Config;
use crate::error::AppError;
use crate::ocsf;
use crate::types::Operation;

/// Outcome of a successful gate check.
#[derive(Debug, Clone)]
pub enum Caller {
    /// Unprotected operation; any token was ignored.
    Anonymous,
    /// Token verified against the provider's signing keys.
    Verified(Claims),
}

impl Caller {
    pub fn subject(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Verified(claims) => claims.sub.as_deref(),
        }
    }
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
///
/// Any other scheme, or a header that is not valid ASCII, counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Let `+` and `-` through; require a verified token for `*` and `/`.
///
/// A missing token is `AuthenticationRequired`; a token that fails any
/// check (including key retrieval) is `InvalidToken`.
pub async fn authorize(
    operation: Operation,
    headers: &HeaderMap,
    jwks_cache: &JwksCache,
    config: &Config,
) -> Result<Caller, AppError> {
    if !operation.is_protected() {
        return Ok(Caller::Anonymous);
    }

    let Some(token) = bearer_token(headers) else {
        return Err(AppError::AuthenticationRequired);
    };

    match verify_token(token, jwks_cache, config).await {
        Ok(claims) => {
            ocsf::token_verification_event(
                ocsf::STATUS_SUCCESS,
                ocsf::SEVERITY_INFORMATIONAL,
                claims.sub.as_deref(),
                &format!("Bearer token accepted for {operation}"),
            );
            Ok(Caller::Verified(claims))
        }
        Err(e) => {
            let severity = match e {
                JwtError::Expired => ocsf::SEVERITY_LOW,
                JwtError::JwksFetchFailed(_) => ocsf::SEVERITY_MEDIUM,
                _ => ocsf::SEVERITY_HIGH,
            };
            ocsf::token_verification_event(
                ocsf::STATUS_FAILURE,
                severity,
                None,
                &format!("Bearer token rejected: {e}"),
            );
            Err(AppError::InvalidToken)
        }
    }
}
