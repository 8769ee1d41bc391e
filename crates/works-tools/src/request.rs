//! Outbound request description and URL building.
//!
//! Tools produce an [`ApiRequest`] from validated arguments; the client turns it into exactly one
//! HTTP call. Keeping this step pure lets tests assert on the shaped request without a server.

use crate::error::{Result, WorksToolsError};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub key: String,
    pub value: String,
}

/// A single shaped call against the Works API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL; segments are already percent-encoded.
    pub path: String,
    pub query: Vec<QueryPair>,
    pub body: Option<Value>,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path.into())
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path.into())
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut req = Self::new(Method::POST, path.into());
        req.body = Some(body);
        req
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push(QueryPair {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the first query pair named `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

/// Join `path` onto `base_url` and attach the encoded query string.
///
/// # Errors
///
/// Returns a validation error if the resulting URL does not parse.
pub fn build_url(base_url: &Url, path: &str, query_params: &[QueryPair]) -> Result<Url> {
    let url = format!("{}{}", base_url.as_str().trim_end_matches('/'), path);
    let mut url = Url::parse(&url)
        .map_err(|e| WorksToolsError::validation(format!("Invalid URL: {e}")))?;

    if !query_params.is_empty() {
        let mut query = String::new();
        for (i, p) in query_params.iter().enumerate() {
            if i > 0 {
                query.push('&');
            }
            query.push_str(&encode_component(&p.key));
            query.push('=');
            query.push_str(&encode_component(&p.value));
        }
        url.set_query(Some(&query));
    }

    Ok(url)
}

/// Percent-encode a single path segment (ids are caller-supplied).
#[must_use]
pub fn path_segment(s: &str) -> String {
    encode_component(s)
}

/// Encode everything outside the RFC 3986 unreserved set.
///
/// In particular `+` always goes out as `%2B`, so offsets such as `+09:00` survive servers that
/// decode `+` as a space.
fn encode_component(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.worksapis.com/v1.0").expect("valid base")
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let url = build_url(&base(), "/users/me/tasks", &[]).expect("url");
        assert_eq!(url.as_str(), "https://www.worksapis.com/v1.0/users/me/tasks");
    }

    #[test]
    fn build_url_encodes_plus_in_query_values() {
        let req = ApiRequest::get("/users/me/calendar/events")
            .query("fromDateTime", "2024-01-15T00:00:00+09:00");
        let url = build_url(&base(), &req.path, &req.query).expect("url");
        let query = url.query().expect("query");
        assert!(query.contains("%2B09"), "query was {query}");
        assert!(!query.contains('+'));
    }

    #[test]
    fn path_segment_escapes_separators() {
        assert_eq!(path_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(path_segment("T-1_x.y~"), "T-1_x.y~");
    }

    #[test]
    fn builder_collects_query_pairs_in_order() {
        let req = ApiRequest::get("/x").query("count", 50).query("status", "TODO");
        assert_eq!(req.query_value("count"), Some("50"));
        assert_eq!(req.query[1].key, "status");
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }
}
