//! HTTP client for the calculation endpoint.
//!
//! Does what the browser calculator does: attach the bearer token for
//! protected operations, and surface the server's `error` message verbatim.

use reqwest::header::AUTHORIZATION;

use super::identity::IdentityProvider;
use crate::types::{CalculationRequest, CalculationResponse, ErrorResponse};

pub struct CalculatorClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl CalculatorClient {
    /// `endpoint` is the full URL, e.g. `https://calc.example.com/calculate`.
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// POST the calculation, asking `identity` for a token when the
    /// operation is protected. Not being signed in is `LoginRequired`; a
    /// signed-in user whose token cannot be obtained is `TokenUnavailable`.
    pub async fn calculate_with(
        &self,
        req: &CalculationRequest,
        identity: &dyn IdentityProvider,
    ) -> Result<CalculationResponse, ClientError> {
        if !req.operation.is_protected() {
            return self.calculate(req, None).await;
        }
        if !identity.is_authenticated().await {
            return Err(ClientError::LoginRequired);
        }
        let token = identity.get_token().await.map_err(|e| {
            tracing::warn!(error = %e, "could not obtain access token");
            ClientError::TokenUnavailable(e.to_string())
        })?;
        self.calculate(req, Some(&token)).await
    }

    /// POST the calculation. `token` is only sent for protected operations;
    /// a protected operation without one fails before any network call.
    pub async fn calculate(
        &self,
        req: &CalculationRequest,
        token: Option<&str>,
    ) -> Result<CalculationResponse, ClientError> {
        let mut builder = self.http_client.post(&self.endpoint).json(req);

        if req.operation.is_protected() {
            let token = token.ok_or(ClientError::LoginRequired)?;
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        // Capture status before consuming the body
        let status = resp.status();

        if !status.is_success() {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "Calculation failed".into());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        resp.json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Login required for this operation")]
    LoginRequired,

    #[error("Could not obtain authorization token: {0}")]
    TokenUnavailable(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}
