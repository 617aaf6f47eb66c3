//! Wire frame parsing and subscription commands
//!
//! The bus pushes JSON text frames tagged with an event category name and a
//! `data` payload. Unknown categories and non-event frames (subscription
//! replies, heartbeats) are ignored rather than treated as errors — the
//! system favors availability over strict protocol conformance.

use informer_core::models::CallEvent;
use informer_core::{AppError, AppResult};
use serde_json::{json, Value};

/// Channel created (call started ringing)
pub const CHANNEL_CREATE: &str = "CHANNEL_CREATE";

/// Channel answered (call connected)
pub const CHANNEL_ANSWER: &str = "CHANNEL_ANSWER";

/// Channel destroyed (call ended)
pub const CHANNEL_DESTROY: &str = "CHANNEL_DESTROY";

/// All categories the client subscribes to
pub const CALL_EVENT_CATEGORIES: &[&str] = &[CHANNEL_CREATE, CHANNEL_ANSWER, CHANNEL_DESTROY];

/// Build the subscribe command for one event category
pub fn subscribe_frame(auth_token: &str, account_id: &str, category: &str) -> String {
    json!({
        "action": "subscribe",
        "auth_token": auth_token,
        "account_id": account_id,
        "binding": format!("call.{}.*", category),
    })
    .to_string()
}

/// Parse one inbound text frame
///
/// Returns `Ok(None)` for frames that are not call events (subscribe
/// replies, unknown categories). Malformed JSON or an event frame without a
/// `call_id` is a [`AppError::ProtocolParse`] — the caller logs and drops it.
pub fn parse_frame(raw: &str) -> AppResult<Option<CallEvent>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::ProtocolParse(format!("invalid JSON frame: {}", e)))?;

    // Frames without a category name are replies or server chatter
    let Some(name) = value.get("name").and_then(Value::as_str) else {
        return Ok(None);
    };

    let data = value.get("data").cloned().unwrap_or(Value::Null);

    match name {
        CHANNEL_CREATE => {
            let call_id = required_field(&data, "call_id")?;
            let caller_number = required_field(&data, "caller_id_number")?;
            Ok(Some(CallEvent::Create {
                call_id,
                caller_number,
                callee_number: optional_field(&data, "callee_id_number"),
            }))
        }
        CHANNEL_ANSWER => {
            let call_id = required_field(&data, "call_id")?;
            Ok(Some(CallEvent::Answer { call_id }))
        }
        CHANNEL_DESTROY => {
            let call_id = required_field(&data, "call_id")?;
            Ok(Some(CallEvent::Destroy {
                call_id,
                hangup_cause: optional_field(&data, "hangup_cause"),
            }))
        }
        _ => Ok(None),
    }
}

fn required_field(data: &Value, key: &str) -> AppResult<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::ProtocolParse(format!("event frame missing {}", key)))
}

fn optional_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
