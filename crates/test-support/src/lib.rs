//! Test helpers shared by the `works-tools` and `works-mcp` test suites.
//!
//! The main piece is [`MockWorksApi`]: an in-process axum server that stands in for the Works
//! REST API, answers with canned replies and records every request it sees.

use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Path prefix the mock serves under, mirroring the real API version segment.
pub const API_PREFIX: &str = "/v1.0";

/// One request as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path with [`API_PREFIX`] stripped, e.g. `/users/me/tasks`.
    pub path: String,
    /// Raw (still percent-encoded) query string.
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Parsed JSON body; `null` when the request had none.
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    body: String,
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<(String, String), Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Recording stand-in for the Works API. Shuts down when dropped.
pub struct MockWorksApi {
    base_url: String,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockWorksApi {
    /// Bind an ephemeral localhost port and start serving.
    ///
    /// Routes without a configured reply answer `404 {"code": "NOT_FOUND"}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/{*path}", any(handle))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock works api")?;
        let addr = listener.local_addr().context("mock local_addr")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Base URL to hand to the client under test, including [`API_PREFIX`].
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    /// Answer `method path` with `status` and a literal body (may be empty or non-JSON).
    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.state.replies.lock().insert(
            (method.to_ascii_uppercase(), path.to_string()),
            Reply {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

impl Drop for MockWorksApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| json!(String::from_utf8_lossy(&body).into_owned()))
    };

    let key = (method.as_str().to_string(), path.clone());
    state.requests.lock().push(RecordedRequest {
        method: method.as_str().to_string(),
        path,
        query: uri.query().map(str::to_string),
        authorization,
        body,
    });

    let reply = state.replies.lock().get(&key).cloned().unwrap_or(Reply {
        status: 404,
        body: json!({"code": "NOT_FOUND"}).to_string(),
    });
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}
