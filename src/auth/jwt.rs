//! Bearer token verification against the identity provider's JWKS.
//!
//! Keys are fetched from the provider's published key-set endpoint and
//! cached process-wide with a TTL. Every failure path rejects the token.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::Config;

/// Claims we read from a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<Audience>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `aud` is a string for single-API tokens and an array when the
/// provider also grants its userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

/// JWKS key entry from `/.well-known/jwks.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkKey {
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
}

/// JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwkKey>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Cached JWKS keys with TTL-based expiry.
pub struct JwksCache {
    keys: RwLock<Option<CachedKeys>>,
    ttl: Duration,
    min_refresh: Duration,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl JwksCache {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            keys: RwLock::new(None),
            ttl: Duration::from_secs(600),
            min_refresh: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            http_client,
        }
    }

    pub fn from_config(http_client: reqwest::Client, config: &Config) -> Self {
        Self::new(http_client)
            .with_ttl(config.jwks_cache_ttl)
            .with_min_refresh(config.jwks_min_refresh)
            .with_timeout(config.jwks_timeout)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_min_refresh(mut self, min_refresh: Duration) -> Self {
        self.min_refresh = min_refresh;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the signing key for `kid`, fetching the key set when the
    /// cache is empty, expired, or (rate-limited) missing the `kid`.
    pub async fn get_key(&self, jwks_url: &str, kid: &str) -> Result<DecodingKey, JwtError> {
        {
            let guard = self.keys.read().await;
            if let Some(cached) = guard.as_ref()
                && cached.fetched_at.elapsed() < self.ttl
            {
                if let Some(key) = cached.keys.get(kid) {
                    return Ok(key.clone());
                }
                if cached.fetched_at.elapsed() < self.min_refresh {
                    return Err(JwtError::KeyNotFound(kid.into()));
                }
            }
        }

        let keys = self.fetch(jwks_url).await?;
        let found = keys.get(kid).cloned();

        let mut guard = self.keys.write().await;
        *guard = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        found.ok_or_else(|| JwtError::KeyNotFound(kid.into()))
    }

    async fn fetch(&self, jwks_url: &str) -> Result<HashMap<String, DecodingKey>, JwtError> {
        tracing::debug!(jwks_url, "fetching signing keys");
        let resp = self
            .http_client
            .get(jwks_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| JwtError::JwksFetchFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(JwtError::JwksFetchFailed(format!("HTTP {}", resp.status())));
        }

        let jwks: JwksResponse = resp
            .json()
            .await
            .map_err(|e| JwtError::JwksFetchFailed(e.to_string()))?;

        let mut key_map = HashMap::new();
        for key in &jwks.keys {
            let (Some(n), Some(e)) = (key.n.as_deref(), key.e.as_deref()) else {
                continue;
            };
            if key.kty != "RSA" || key.key_use.as_deref().is_some_and(|u| u != "sig") {
                continue;
            }
            match DecodingKey::from_rsa_components(n, e) {
                Ok(dk) => {
                    key_map.insert(key.kid.clone(), dk);
                }
                Err(err) => tracing::warn!(kid = %key.kid, %err, "skipping unusable JWK"),
            }
        }

        Ok(key_map)
    }

    /// Drop every cached key; the next lookup refetches.
    pub async fn clear(&self) {
        let mut guard = self.keys.write().await;
        *guard = None;
    }
}

/// Verify an access token's RS256 signature, issuer, audience, and expiry.
pub async fn verify_token(
    token: &str,
    jwks_cache: &JwksCache,
    config: &Config,
) -> Result<Claims, JwtError> {
    let header = decode_header(token).map_err(|_| JwtError::InvalidFormat)?;
    if header.alg != Algorithm::RS256 {
        return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
    }
    let kid = header.kid.ok_or(JwtError::MissingKid)?;

    let decoding_key = jwks_cache.get_key(&config.jwks_url, &kid).await?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[&config.auth_issuer]);
    validation.set_audience(&[&config.auth_audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Validation(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Invalid JWT format")]
    InvalidFormat,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token missing kid header")]
    MissingKid,

    #[error("Signing key not found for kid: {0}")]
    KeyNotFound(String),

    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    #[error("Token expired")]
    Expired,

    #[error("JWT validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_jwt(header: &str) -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(r#"{"sub":"u","exp":9999999999}"#),
            URL_SAFE_NO_PAD.encode(b"fake-signature")
        )
    }

    fn cache() -> JwksCache {
        JwksCache::new(reqwest::Client::new()).with_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let err = verify_token("not-a-jwt", &cache(), &Config::test_default())
            .await
            .unwrap_err();
        assert!(matches!(err, JwtError::InvalidFormat));
    }

    #[tokio::test]
    async fn test_hs256_token_rejected_before_key_fetch() {
        let token = unsigned_jwt(r#"{"alg":"HS256","typ":"JWT","kid":"k1"}"#);
        let err = verify_token(&token, &cache(), &Config::test_default())
            .await
            .unwrap_err();
        assert!(matches!(err, JwtError::UnsupportedAlgorithm(_)));
    }

    #[tokio::test]
    async fn test_missing_kid_rejected() {
        let token = unsigned_jwt(r#"{"alg":"RS256","typ":"JWT"}"#);
        let err = verify_token(&token, &cache(), &Config::test_default())
            .await
            .unwrap_err();
        assert!(matches!(err, JwtError::MissingKid));
    }

    #[tokio::test]
    async fn test_unreachable_jwks_fails_closed() {
        let mut config = Config::test_default();
        // Port 9 (discard) on localhost is closed in test environments.
        config.jwks_url = "http://127.0.0.1:9/.well-known/jwks.json".into();
        let token = unsigned_jwt(r#"{"alg":"RS256","typ":"JWT","kid":"k1"}"#);
        let err = verify_token(&token, &cache(), &config).await.unwrap_err();
        assert!(matches!(err, JwtError::JwksFetchFailed(_)));
    }

    #[test]
    fn test_audience_shapes() {
        let single: Claims = serde_json::from_str(r#"{"aud":"api"}"#).unwrap();
        assert_eq!(single.aud, Some(Audience::Single("api".into())));
        let many: Claims = serde_json::from_str(r#"{"aud":["api","userinfo"]}"#).unwrap();
        assert_eq!(
            many.aud,
            Some(Audience::Many(vec!["api".into(), "userinfo".into()]))
        );
    }

    #[test]
    fn test_jwks_response_tolerates_non_rsa_keys() {
        let jwks: JwksResponse = serde_json::from_str(
            r#"{"keys":[{"kid":"ec","kty":"EC","crv":"P-256","x":"a","y":"b"},
                        {"kid":"rsa","kty":"RSA","n":"AQAB","e":"AQAB","use":"sig"}]}"#,
        )
        .unwrap();
        assert_eq!(jwks.keys.len(), 2);
        assert!(jwks.keys[0].n.is_none());
        assert_eq!(jwks.keys[1].key_use.as_deref(), Some("sig"));
    }
}
