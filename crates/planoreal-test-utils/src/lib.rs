//! Shared test utilities for planoreal integration tests.
//!
//! Provides a fake OpenAI-compatible chat-completion endpoint. Each test
//! starts its own server on an ephemeral localhost port, points the gateway
//! at [`FakeUpstream::base_url`], and inspects what was received.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::task::JoinHandle;

/// A request captured by the fake upstream.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub title: Option<String>,
    pub body: Value,
}

/// Canned reply returned for every request.
#[derive(Debug, Clone)]
enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

#[derive(Clone)]
struct FakeState {
    reply: Reply,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// A running fake chat-completion server. Aborted on drop.
pub struct FakeUpstream {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    /// Start a server answering `200` with a chat completion whose
    /// `choices[0].message.content` is `content`.
    pub async fn replying(content: &str) -> Self {
        Self::start(Reply::Json(StatusCode::OK, chat_completion(content))).await
    }

    /// Start a server answering with an arbitrary JSON body.
    pub async fn with_json(status: u16, body: Value) -> Self {
        Self::start(Reply::Json(status_code(status), body)).await
    }

    /// Start a server answering with a plain-text body.
    pub async fn with_text(status: u16, body: &str) -> Self {
        Self::start(Reply::Text(status_code(status), body.to_string())).await
    }

    async fn start(reply: Reply) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            reply,
            received: received.clone(),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake upstream");
        let addr = listener.local_addr().expect("failed to read local addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            received,
            handle,
        }
    }

    /// Base URL to configure the gateway with (ends in `/v1`).
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Requests received so far, in arrival order.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().expect("received lock poisoned").clone()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Build a minimal chat-completion reply carrying `content`.
pub fn chat_completion(content: &str) -> Value {
    serde_json::json!({
        "id": "gen-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("invalid status code")
}

async fn handle(State(state): State<FakeState>, headers: HeaderMap, body: Json<Value>) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state
        .received
        .lock()
        .expect("received lock poisoned")
        .push(ReceivedRequest {
            authorization: header("authorization"),
            title: header("x-title"),
            body: body.0,
        });

    match state.reply {
        Reply::Json(status, value) => (status, Json(value)).into_response(),
        Reply::Text(status, text) => (status, text).into_response(),
    }
}
