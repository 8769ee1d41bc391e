//! MCP tool annotations derived from the HTTP method a tool issues.
//!
//! Every Works tool maps to exactly one GET, POST or DELETE, so the hints follow RFC 9110 method
//! semantics for those three.

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// Annotations for a tool that issues `method` against the Works API.
///
/// `openWorldHint` is always `true`: every tool talks to the remote suite.
#[must_use]
pub fn annotations_for_method(method: &Method, title: &str) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match *method {
        Method::GET => (Some(true), Some(false), Some(true)),
        Method::POST => (Some(false), Some(false), Some(false)),
        Method::DELETE => (Some(false), Some(true), Some(true)),
        // Not issued by any Works tool.
        _ => (None, None, None),
    };
    ToolAnnotations {
        title: Some(title.to_string()),
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
