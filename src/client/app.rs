//! Keypad wired to the HTTP client and an identity provider: what a
//! front end drives with raw key presses.

use std::sync::Arc;

use super::api::{CalculatorClient, ClientError};
use super::identity::IdentityProvider;
use super::keypad::Keypad;

pub struct Calculator {
    keypad: Keypad,
    client: CalculatorClient,
    identity: Arc<dyn IdentityProvider>,
}

impl Calculator {
    pub fn new(client: CalculatorClient, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            keypad: Keypad::new(),
            client,
            identity,
        }
    }

    pub fn display(&self) -> &str {
        self.keypad.display()
    }

    /// Who is signed in, for the header line. `None` when signed out.
    pub async fn greeting(&self) -> Option<String> {
        if !self.identity.is_authenticated().await {
            return None;
        }
        let user = self.identity.current_user().await?;
        user.display_name().map(str::to_string)
    }

    /// Feed one key. When the key completes a calculation it is sent to
    /// the server and the answer lands on the display; on failure the
    /// operands stay put and the error is returned for the caller to show.
    pub async fn press(&mut self, key: &str) -> Result<(), ClientError> {
        let signed_in = self.identity.is_authenticated().await;
        let Some(req) = self.keypad.press(key, signed_in) else {
            return Ok(());
        };

        match self.client.calculate_with(&req, self.identity.as_ref()).await {
            Ok(resp) => {
                self.keypad.apply_result(resp.result);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, operation = %req.operation, "calculation failed");
                self.keypad.apply_error();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::identity::{IdentityError, User};
    use async_trait::async_trait;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct SignedIn(&'static str);
    struct SignedOut;

    #[async_trait]
    impl IdentityProvider for SignedIn {
        async fn is_authenticated(&self) -> bool {
            true
        }
        async fn current_user(&self) -> Option<User> {
            Some(User {
                name: None,
                email: Some("ada@example.com".into()),
            })
        }
        async fn get_token(&self) -> Result<String, IdentityError> {
            Ok(self.0.into())
        }
    }

    #[async_trait]
    impl IdentityProvider for SignedOut {
        async fn is_authenticated(&self) -> bool {
            false
        }
        async fn current_user(&self) -> Option<User> {
            None
        }
        async fn get_token(&self) -> Result<String, IdentityError> {
            Err(IdentityError::LoginRequired)
        }
    }

    async fn type_keys(calc: &mut Calculator, keys: &[&str]) -> Result<(), ClientError> {
        for key in keys {
            calc.press(key).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_signed_in_multiplication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer tok-ada"))
            .and(body_json(serde_json::json!({"a": 12.0, "b": 3.0, "operation": "*"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": 36.0,
                "operation": "12 * 3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CalculatorClient::new(reqwest::Client::new(), server.uri());
        let mut calc = Calculator::new(client, Arc::new(SignedIn("tok-ada")));

        type_keys(&mut calc, &["1", "2", "*", "3", "Enter"]).await.unwrap();
        assert_eq!(calc.display(), "36");
        assert_eq!(calc.greeting().await.as_deref(), Some("ada@example.com"));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_signed_out_cannot_pick_protected_operator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = CalculatorClient::new(reqwest::Client::new(), server.uri());
        let mut calc = Calculator::new(client, Arc::new(SignedOut));

        // "/" is ignored, so "9" and "3" join into one operand.
        type_keys(&mut calc, &["9", "/", "3", "Enter"]).await.unwrap();
        assert_eq!(calc.display(), "93");
        assert_eq!(calc.greeting().await, None);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_server_error_keeps_operands() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Division by zero is not allowed"
            })))
            .mount(&server)
            .await;

        let client = CalculatorClient::new(reqwest::Client::new(), server.uri());
        let mut calc = Calculator::new(client, Arc::new(SignedIn("tok")));

        let err = type_keys(&mut calc, &["5", "/", "0", "="]).await.unwrap_err();
        assert_eq!(err.to_string(), "Division by zero is not allowed");
        assert_eq!(calc.display(), "0");
    }
}
