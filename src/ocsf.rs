//! OCSF (Open Cybersecurity Schema Framework) structured event logging.
//!
//! Events are emitted via `tracing::info!` as structured JSON under the
//! `ocsf` target. Never panics. Raw tokens never appear in an event.

use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

// OCSF event class UIDs
pub const CLASS_AUTHENTICATION: u32 = 3001;
pub const CLASS_API_ACTIVITY: u32 = 6003;

// Activity IDs
pub const ACTIVITY_LOGON: u32 = 1;
pub const ACTIVITY_API_READ: u32 = 2;

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;
pub const SEVERITY_HIGH: u32 = 4;

pub const AUTH_PROTOCOL_OAUTH2: u32 = 10;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        SEVERITY_HIGH => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

fn product() -> serde_json::Value {
    json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })
}

fn with_actor(event: &mut serde_json::Value, subject: Option<&str>) {
    if let Some(sub) = subject {
        event["actor"] = json!({
            "user": {
                "uid": sub,
                "type_id": 1,
                "type": "User"
            }
        });
    }
}

/// Emit an OCSF event as structured JSON via tracing. Never panics.
fn emit(event: &serde_json::Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "ocsf", "{}", json);
    }
}

/// Build an Authentication (3001) event for a bearer-token verification.
pub fn token_verification(
    status_id: u32,
    severity_id: u32,
    subject: Option<&str>,
    message: &str,
) -> serde_json::Value {
    let mut event = json!({
        "class_uid": CLASS_AUTHENTICATION,
        "class_name": "Authentication",
        "activity_id": ACTIVITY_LOGON,
        "activity_name": "Logon",
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": { "product": product() },
        "auth_protocol_id": AUTH_PROTOCOL_OAUTH2,
        "auth_protocol": "OAuth 2.0/OIDC",
        "message": message,
    });
    with_actor(&mut event, subject);
    event
}

/// Emit a token verification event.
pub fn token_verification_event(
    status_id: u32,
    severity_id: u32,
    subject: Option<&str>,
    message: &str,
) {
    emit(&token_verification(status_id, severity_id, subject, message));
}

/// Build an API Activity (6003) event for one calculation request.
pub fn calculation(
    operation: &str,
    http_status: u16,
    subject: Option<&str>,
    message: &str,
) -> serde_json::Value {
    let (status_id, severity_id) = match http_status {
        200..=299 => (STATUS_SUCCESS, SEVERITY_INFORMATIONAL),
        401 => (STATUS_FAILURE, SEVERITY_MEDIUM),
        500..=599 => (STATUS_FAILURE, SEVERITY_HIGH),
        _ => (STATUS_FAILURE, SEVERITY_LOW),
    };
    let mut event = json!({
        "class_uid": CLASS_API_ACTIVITY,
        "class_name": "API Activity",
        "activity_id": ACTIVITY_API_READ,
        "activity_name": "Read",
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": { "product": product() },
        "api": {
            "operation": operation,
            "response": { "code": http_status }
        },
        "message": message,
    });
    with_actor(&mut event, subject);
    event
}

/// Emit a calculation event.
pub fn calculation_event(operation: &str, http_status: u16, subject: Option<&str>, message: &str) {
    emit(&calculation(operation, http_status, subject, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_verification_event_shape() {
        let event = token_verification(STATUS_FAILURE, SEVERITY_HIGH, None, "Token expired");
        assert_eq!(event["class_uid"], CLASS_AUTHENTICATION);
        assert_eq!(event["status"], "Failure");
        assert_eq!(event["severity"], "High");
        assert_eq!(event["message"], "Token expired");
        assert!(event.get("actor").is_none());
    }

    #[test]
    fn test_calculation_event_with_actor() {
        let event = calculation("*", 200, Some("auth0|abc"), "ok");
        assert_eq!(event["class_uid"], CLASS_API_ACTIVITY);
        assert_eq!(event["status_id"], STATUS_SUCCESS);
        assert_eq!(event["api"]["operation"], "*");
        assert_eq!(event["api"]["response"]["code"], 200);
        assert_eq!(event["actor"]["user"]["uid"], "auth0|abc");
    }

    #[test]
    fn test_calculation_event_severity_by_status() {
        assert_eq!(calculation("/", 401, None, "")["severity"], "Medium");
        assert_eq!(calculation("/", 400, None, "")["severity"], "Low");
        assert_eq!(calculation("+", 500, None, "")["severity"], "High");
    }
}
