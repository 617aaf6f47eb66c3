//! Auth handshake against the event bus
//!
//! The bus hands out a session token over HTTP before the websocket may be
//! opened. The request carries the login, the realm, and a hash of
//! `login:password` computed with the configured algorithm; the password
//! itself never goes over the wire.
//!
//! Every failure in this phase maps to [`AppError::AuthFailed`] — bad
//! credentials and an unreachable or misconfigured auth endpoint both mean
//! "reconfiguration may be needed", which callers must be able to tell apart
//! from transient event-stream churn.

use informer_core::{config::ConnectionConfig, AppError, AppResult};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Credentials obtained from a successful handshake
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session token expected by the event stream
    pub auth_token: String,

    /// Account the token is scoped to; used in subscription bindings
    pub account_id: String,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    data: AuthPayload<'a>,
}

#[derive(Serialize)]
struct AuthPayload<'a> {
    login: &'a str,
    realm: &'a str,
    credentials: String,
}

/// Perform the handshake and return the session credentials
pub async fn authenticate(
    http: &reqwest::Client,
    conn: &ConnectionConfig,
) -> AppResult<AuthSession> {
    let request = AuthRequest {
        data: AuthPayload {
            login: &conn.login,
            realm: &conn.realm,
            credentials: conn.credential_digest(),
        },
    };

    debug!(auth_url = %conn.auth_url, login = %conn.login, "requesting session token");

    let response = http
        .put(&conn.auth_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::AuthFailed(format!("auth endpoint unreachable: {}", e)))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::AuthFailed(format!(
            "credentials rejected (status {})",
            status.as_u16()
        )));
    }
    if !status.is_success() {
        return Err(AppError::AuthFailed(format!(
            "auth endpoint returned status {}",
            status.as_u16()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::AuthFailed(format!("malformed auth response: {}", e)))?;

    parse_auth_response(&body)
}

fn parse_auth_response(body: &Value) -> AppResult<AuthSession> {
    let auth_token = body
        .get("auth_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::AuthFailed("auth response carried no token".to_string()))?
        .to_string();

    let account_id = body
        .pointer("/data/account_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(AuthSession {
        auth_token,
        account_id,
    })
}
