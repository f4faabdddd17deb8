//! SSE channel served at `/sse` and `/sse/message`.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to post its messages to. Each posted message is answered on the stream as
//! a `message` event while the POST itself returns `202 Accepted`.

use async_trait::async_trait;
use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{StreamExt, stream};
use serde::Deserialize;
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::jsonrpc::handle_body;
use super::router::{
    ProtocolAdapter, SSE_MESSAGE_PATH, SSE_PATH, method_not_allowed, not_found, read_body,
};
use crate::core::McpServer;

/// Responses buffered per session before a POST waits on the stream.
const SESSION_BUFFER: usize = 64;

type SessionMap = Arc<RwLock<HashMap<String, mpsc::Sender<String>>>>;

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Adapter for the HTTP+SSE channel.
pub struct SseAdapter {
    server: McpServer,
    sessions: SessionMap,
    keep_alive: Duration,
}

/// Removes its session from the table when the stream is dropped.
struct SessionGuard {
    id: String,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        info!(session_id = %self.id, "SSE client disconnected");
    }
}

impl SseAdapter {
    pub fn new(server: McpServer, keep_alive: Duration) -> Self {
        Self {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            keep_alive,
        }
    }

    /// Number of open streams.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn sender(&self, session_id: &str) -> Option<mpsc::Sender<String>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// `GET /sse`: register a session and stream its responses.
    fn open_stream(&self) -> Response {
        let session_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), tx);
        info!(session_id = %session_id, "SSE client connected");

        let endpoint = Event::default()
            .event("endpoint")
            .data(format!("{}?sessionId={}", SSE_MESSAGE_PATH, session_id));

        let guard = SessionGuard {
            id: session_id,
            sessions: self.sessions.clone(),
        };
        let messages = ReceiverStream::new(rx).map(move |data| {
            // The session lives as long as this stream.
            let _ = &guard;
            Ok::<_, Infallible>(Event::default().event("message").data(data))
        });

        let stream = stream::once(async move { Ok(endpoint) }).chain(messages);

        Sse::new(stream)
            .keep_alive(KeepAlive::new().interval(self.keep_alive))
            .into_response()
    }

    /// `POST /sse/message?sessionId=…`: dispatch and push the reply to the stream.
    async fn post_message(&self, request: Request) -> Response {
        let query = request.uri().query().unwrap_or_default();
        let session_id = match serde_urlencoded::from_str::<SessionQuery>(query) {
            Ok(SessionQuery {
                session_id: Some(id),
            }) if !id.is_empty() => id,
            _ => {
                warn!("SSE message without sessionId");
                return (StatusCode::BAD_REQUEST, "Missing sessionId").into_response();
            }
        };

        let Some(sender) = self.sender(&session_id) else {
            warn!(session_id = %session_id, "SSE message for unknown session");
            return (StatusCode::NOT_FOUND, "Session not found").into_response();
        };

        let body = match read_body(request.into_body()).await {
            Ok(body) => body,
            Err(response) => return response,
        };

        let reply = match handle_body(&self.server, &body) {
            Ok(reply) => reply,
            Err(parse_error) => return (StatusCode::BAD_REQUEST, Json(parse_error)).into_response(),
        };

        if let Some(json) = reply.to_json() {
            if sender.send(json.to_string()).await.is_err() {
                warn!(session_id = %session_id, "SSE stream closed before reply was sent");
                return (StatusCode::NOT_FOUND, "Session not found").into_response();
            }
        }

        (StatusCode::ACCEPTED, "Accepted").into_response()
    }
}

#[async_trait]
impl ProtocolAdapter for SseAdapter {
    #[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
    async fn handle(&self, request: Request) -> Response {
        let is_get = request.method() == Method::GET;
        let is_post = request.method() == Method::POST;
        match request.uri().path() {
            SSE_PATH if is_get => self.open_stream(),
            SSE_PATH => method_not_allowed("GET"),
            SSE_MESSAGE_PATH if is_post => self.post_message(request).await,
            SSE_MESSAGE_PATH => method_not_allowed("POST"),
            _ => not_found(),
        }
    }
}
