//! Test utilities: RSA keypair, JWT factory, test app builder, wiremock JWKS.

#![allow(dead_code)]

use auth_calculator::auth::jwt::JwksCache;
use auth_calculator::config::Config;
use auth_calculator::{create_app, AppState};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Test RSA keypair for signing JWTs.
pub struct TestKeys {
    pub private_key: RsaPrivateKey,
    pub kid: String,
}

impl TestKeys {
    pub fn generate() -> Self {
        let mut rng = rsa::rand_core::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate key");
        Self {
            private_key,
            kid: "test-key-1".into(),
        }
    }

    /// One keypair per test binary; generation is the slow part.
    pub fn shared() -> &'static TestKeys {
        static KEYS: OnceLock<TestKeys> = OnceLock::new();
        KEYS.get_or_init(TestKeys::generate)
    }

    /// A second keypair under another `kid`, standing in for a rotated key.
    pub fn rotated() -> &'static TestKeys {
        static KEYS: OnceLock<TestKeys> = OnceLock::new();
        KEYS.get_or_init(|| TestKeys {
            kid: "test-key-2".into(),
            ..TestKeys::generate()
        })
    }

    /// Build a signed JWT with the given claims.
    pub fn sign_jwt(&self, claims: &serde_json::Value) -> String {
        self.sign_jwt_with_kid(claims, &self.kid)
    }

    pub fn sign_jwt_with_kid(&self, claims: &serde_json::Value, kid: &str) -> String {
        let der = self
            .private_key
            .to_pkcs1_der()
            .expect("failed to encode private key");
        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_der(der.as_bytes());

        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = Some(kid.into());

        jsonwebtoken::encode(&header, claims, &encoding_key).expect("failed to sign JWT")
    }

    /// Build JWKS JSON response for wiremock.
    pub fn jwks_json(&self) -> serde_json::Value {
        json!({ "keys": [self.jwk()] })
    }

    fn jwk(&self) -> serde_json::Value {
        let public_key = self.private_key.to_public_key();
        json!({
            "kid": self.kid,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be())
        })
    }
}

/// JWKS document publishing every key in `keys`.
pub fn jwks_json_for(keys: &[&TestKeys]) -> serde_json::Value {
    json!({ "keys": keys.iter().map(|k| k.jwk()).collect::<Vec<_>>() })
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims the test config accepts.
pub fn valid_claims(config: &Config) -> serde_json::Value {
    let exp = now_secs() + 3600;
    json!({
        "sub": "auth0|user-1",
        "iss": config.auth_issuer,
        "aud": [config.auth_audience, format!("https://{}/userinfo", config.auth_domain)],
        "exp": exp,
        "iat": exp - 3600,
        "scope": "openid profile email"
    })
}

/// Build expired test claims.
pub fn expired_claims(config: &Config) -> serde_json::Value {
    json!({
        "sub": "auth0|user-1",
        "iss": config.auth_issuer,
        "aud": config.auth_audience,
        "exp": 1000,
        "iat": 900
    })
}

/// Start a JWKS server serving the shared test key.
pub async fn mock_jwks() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(TestKeys::shared().jwks_json()))
        .mount(&server)
        .await;
    server
}

/// Test config whose JWKS URL points at `server`.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.jwks_url = format!("{}{}", server.uri(), JWKS_PATH);
    config
}

/// Build a test app from a config.
pub fn build_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let jwks_cache = Arc::new(JwksCache::from_config(reqwest::Client::new(), &config));
    let state = Arc::new(AppState { config, jwks_cache });
    let app = create_app(state.clone());
    (app, state)
}

/// App backed by a live mock JWKS server. Keep the server alive for the test.
pub async fn build_test_app_with_jwks() -> (axum::Router, Arc<AppState>, MockServer) {
    let server = mock_jwks().await;
    let (app, state) = build_test_app(config_for(&server));
    (app, state, server)
}
