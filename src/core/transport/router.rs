//! Path-based dispatch between the HTTP channels.
//!
//! The router only looks at the request path. Method, headers and body are
//! left to the adapter that owns the path.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path of the SSE stream.
pub const SSE_PATH: &str = "/sse";

/// Path clients post SSE session messages to.
pub const SSE_MESSAGE_PATH: &str = "/sse/message";

/// Path of the direct JSON-RPC channel.
pub const MCP_PATH: &str = "/mcp";

/// Something that turns one HTTP request into one HTTP response.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

/// Which adapter a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Streaming,
    Direct,
}

impl Route {
    /// Resolve a request path. Matching is exact.
    pub fn resolve(path: &str) -> Option<Self> {
        match path {
            SSE_PATH | SSE_MESSAGE_PATH => Some(Self::Streaming),
            MCP_PATH => Some(Self::Direct),
            _ => None,
        }
    }
}

/// Forwards each request to the streaming or the direct adapter.
#[derive(Clone)]
pub struct TransportRouter {
    streaming: Arc<dyn ProtocolAdapter>,
    direct: Arc<dyn ProtocolAdapter>,
}

impl TransportRouter {
    pub fn new(streaming: Arc<dyn ProtocolAdapter>, direct: Arc<dyn ProtocolAdapter>) -> Self {
        Self { streaming, direct }
    }

    /// Dispatch one request.
    pub async fn route(&self, request: Request) -> Response {
        match Route::resolve(request.uri().path()) {
            Some(Route::Streaming) => self.streaming.handle(request).await,
            Some(Route::Direct) => self.direct.handle(request).await,
            None => {
                debug!("No route for {}", request.uri().path());
                not_found()
            }
        }
    }

    /// Wrap the router in an axum app that sends every request through [`route`](Self::route).
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(self))
    }
}

async fn dispatch(State(router): State<Arc<TransportRouter>>, request: Request) -> Response {
    router.route(request).await
}

/// `404` with a plain-text `Not found` body.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// `405` advertising the allowed methods.
pub fn method_not_allowed(allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        "Method not allowed",
    )
        .into_response()
}

/// Buffer a request body, mapping a read failure to `400`.
pub(crate) async fn read_body(body: Body) -> Result<Bytes, Response> {
    match body.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            Err((StatusCode::BAD_REQUEST, "Unreadable request body").into_response())
        }
    }
}
