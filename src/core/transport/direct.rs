//! Direct JSON-RPC channel served at `/mcp`.
//!
//! Every POST carries one message or a batch; the answer comes back in the
//! HTTP response. No state survives between requests.

use async_trait::async_trait;
use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{instrument, warn};

use super::jsonrpc::handle_body;
use super::router::{ProtocolAdapter, method_not_allowed, read_body};
use crate::core::McpServer;

/// Adapter answering JSON-RPC POSTs synchronously.
pub struct DirectAdapter {
    server: McpServer,
}

impl DirectAdapter {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl ProtocolAdapter for DirectAdapter {
    #[instrument(skip_all, fields(method = %request.method()))]
    async fn handle(&self, request: Request) -> Response {
        if request.method() != Method::POST {
            warn!("Rejected {} on direct channel", request.method());
            return method_not_allowed("POST");
        }

        let body = match read_body(request.into_body()).await {
            Ok(body) => body,
            Err(response) => return response,
        };

        match handle_body(&self.server, &body) {
            Ok(reply) => match reply.to_json() {
                Some(json) => (StatusCode::OK, Json(json)).into_response(),
                None => StatusCode::ACCEPTED.into_response(),
            },
            Err(parse_error) => (StatusCode::BAD_REQUEST, Json(parse_error)).into_response(),
        }
    }
}
