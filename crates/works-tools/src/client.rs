//! HTTP transport for shaped [`ApiRequest`]s.

use crate::config::WorksApiConfig;
use crate::error::{Result, WorksToolsError};
use crate::request::{ApiRequest, build_url};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Successful (2xx) response from the Works API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `null` for empty bodies, a JSON string for non-JSON text.
    pub body: Value,
}

/// Cheap-to-clone handle that sends one request per call with the configured bearer token.
///
/// Holds no mutable state; concurrent calls need no coordination.
#[derive(Clone)]
pub struct WorksClient {
    inner: Arc<WorksClientInner>,
}

struct WorksClientInner {
    config: WorksApiConfig,
    http: Client,
}

impl WorksClient {
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be built.
    pub fn new(config: WorksApiConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(WorksClientInner { config, http }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &WorksApiConfig {
        &self.inner.config
    }

    /// Send `request` and return the parsed body of a 2xx response.
    ///
    /// # Errors
    ///
    /// - `Http` for any non-2xx status (body attached, parsed as JSON when possible)
    /// - `Transport` for connection failures, timeouts and unreadable bodies
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let config = &self.inner.config;
        let url = build_url(config.base_url(), &request.path, &request.query)?;
        debug!(method = %request.method, url = %redact_url(&url), "works api request");

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .bearer_auth(config.token());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes);

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(WorksToolsError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            })
        }
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| json!(String::from_utf8_lossy(bytes).into_owned()))
}

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_body_handles_empty_json_and_text() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body(b"not json"), json!("not json"));
    }

    #[test]
    fn redact_url_drops_query_and_credentials() {
        let url = Url::parse("https://user:pw@host/v1.0/x?fromDateTime=1#frag").expect("url");
        assert_eq!(redact_url(&url), "https://host/v1.0/x");
    }
}
