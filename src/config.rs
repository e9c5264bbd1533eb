//! Application configuration via environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_RESULT_DECIMALS: u32 = 9;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity provider host, e.g. `tenant.us.auth0.com`.
    pub auth_domain: String,
    pub auth_audience: String,
    pub auth_issuer: String,
    pub jwks_url: String,
    pub jwks_timeout: Duration,
    pub jwks_cache_ttl: Duration,
    /// Minimum spacing between refetches triggered by an unknown `kid`.
    pub jwks_min_refresh: Duration,
    pub calculate_path: String,
    /// Value of `Access-Control-Allow-Origin` on every response.
    pub cors_allow_origin: String,
    /// Decimal places kept in results; `None` returns raw doubles.
    pub result_decimals: Option<u32>,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `AUTH_DOMAIN`, `AUTH_AUDIENCE`. Issuer and JWKS URL are
    /// derived from the domain unless overridden.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth_domain = required_env("AUTH_DOMAIN")?;
        let auth_audience = required_env("AUTH_AUDIENCE")?;

        Ok(Self {
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| issuer_for(&auth_domain)),
            jwks_url: env::var("JWKS_URL").unwrap_or_else(|_| jwks_url_for(&auth_domain)),
            jwks_timeout: Duration::from_secs(parsed_env("JWKS_TIMEOUT_SECS", 5)?),
            jwks_cache_ttl: Duration::from_secs(parsed_env("JWKS_CACHE_TTL_SECS", 600)?),
            jwks_min_refresh: Duration::from_secs(parsed_env("JWKS_MIN_REFRESH_SECS", 30)?),
            calculate_path: calculate_path(env::var("CALCULATE_PATH").ok())?,
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".into()),
            result_decimals: result_decimals(env::var("RESULT_DECIMALS").ok().as_deref())?,
            port: parsed_env("PORT", 8888)?,
            auth_domain,
            auth_audience,
        })
    }
}

/// Configuration for testing, all fields settable directly.
impl Config {
    pub fn test_default() -> Self {
        Self {
            auth_domain: "test-tenant.auth0.com".into(),
            auth_audience: "https://calculator.test/api".into(),
            auth_issuer: issuer_for("test-tenant.auth0.com"),
            jwks_url: jwks_url_for("test-tenant.auth0.com"),
            jwks_timeout: Duration::from_secs(2),
            jwks_cache_ttl: Duration::from_secs(600),
            jwks_min_refresh: Duration::from_secs(30),
            calculate_path: "/calculate".into(),
            cors_allow_origin: "*".into(),
            result_decimals: Some(DEFAULT_RESULT_DECIMALS),
            port: 8888,
        }
    }
}

/// Issuer claim the provider stamps on its tokens (note the trailing slash).
pub fn issuer_for(domain: &str) -> String {
    format!("https://{domain}/")
}

/// Published JWKS endpoint under the provider's domain.
pub fn jwks_url_for(domain: &str) -> String {
    format!("https://{domain}/.well-known/jwks.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(key.into())),
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.into(),
            value: v,
        }),
        Err(_) => Ok(default),
    }
}

fn calculate_path(raw: Option<String>) -> Result<String, ConfigError> {
    match raw {
        None => Ok("/calculate".into()),
        Some(p) if is_literal_route(&p) => Ok(p),
        Some(p) => Err(ConfigError::Invalid {
            key: "CALCULATE_PATH".into(),
            value: p,
        }),
    }
}

/// The router treats `{..}`, `*` and `:` as capture syntax and panics on
/// conflicting routes, so only a plain absolute path besides `/health` passes.
fn is_literal_route(path: &str) -> bool {
    path.starts_with('/')
        && path.len() > 1
        && path != "/health"
        && !path.contains(['{', '}'])
        && path[1..]
            .split('/')
            .all(|segment| !segment.starts_with(['*', ':']))
}

fn result_decimals(raw: Option<&str>) -> Result<Option<u32>, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(DEFAULT_RESULT_DECIMALS)),
        Some(v) if v.eq_ignore_ascii_case("off") || v.eq_ignore_ascii_case("none") => Ok(None),
        // f64 carries ~17 significant digits; more decimals would only amplify noise.
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n <= 15 => Ok(Some(n)),
            _ => Err(ConfigError::Invalid {
                key: "RESULT_DECIMALS".into(),
                value: v.into(),
            }),
        },
    }
}
