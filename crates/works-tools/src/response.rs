//! Response envelopes returned by write and delete tools.
//!
//! Read tools hand back the remote body untouched; writes wrap it as
//! `{success, message, data, status_code}` and deletes (which usually carry no body) report the
//! deleted id under a tool-specific key.

use crate::client::ApiResponse;
use crate::error::{Result, WorksToolsError};
use serde_json::{Value, json};

/// Envelope for a successful create call.
#[must_use]
pub fn created(message: &str, response: ApiResponse) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": response.body,
        "status_code": response.status,
    })
}

/// Envelope for a successful delete call.
///
/// `id_key` is the field that echoes the deleted id (`task_id`, `event_id`, `calendar_id`).
#[must_use]
pub fn deleted(message: String, id_key: &str, id: &str, response: &ApiResponse) -> Value {
    let mut out = json!({
        "success": true,
        "message": message,
        "status_code": response.status,
    });
    out[id_key] = json!(id);
    out
}

/// Pull `key` out of an object body.
///
/// # Errors
///
/// Returns a validation error if the body is not an object or lacks `key`.
pub fn unwrap_key(mut body: Value, key: &str) -> Result<Value> {
    body.as_object_mut()
        .and_then(|o| o.remove(key))
        .ok_or_else(|| {
            WorksToolsError::validation(format!("Invalid response: '{key}' key not found"))
        })
}
