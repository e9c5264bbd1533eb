//! Identity provider seam for the client.
//!
//! The calculator never talks to the provider's login flow itself; it asks
//! an [`IdentityProvider`] whether someone is signed in and for an access
//! token when a protected operation needs one.

use async_trait::async_trait;
use serde::Deserialize;

/// Profile of the signed-in user, as the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Name to greet the user with: `name`, falling back to `email`.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("login required")]
    LoginRequired,

    #[error("token request failed: {0}")]
    TokenRequest(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    async fn current_user(&self) -> Option<User>;

    /// Access token for the calculator API, refreshed silently if needed.
    async fn get_token(&self) -> Result<String, IdentityError>;
}
