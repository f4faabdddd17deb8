//! HTTP transport implementation.
//!
//! Serves both channels from one listener:
//! - `GET /sse` + `POST /sse/message`: JSON-RPC answered over Server-Sent Events
//! - `POST /mcp`: JSON-RPC answered in the HTTP response

use axum::Router;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{
    TransportError, TransportResult,
    config::HttpConfig,
    direct::DirectAdapter,
    router::{MCP_PATH, SSE_MESSAGE_PATH, SSE_PATH, TransportRouter},
    sse::SseAdapter,
};
use crate::core::McpServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Build the axum app: the transport router plus tracing and optional CORS.
    pub fn app(&self, server: McpServer) -> Router {
        let streaming = SseAdapter::new(
            server.clone(),
            Duration::from_secs(self.config.sse_keep_alive_secs),
        );
        let direct = DirectAdapter::new(server);

        let mut app = TransportRouter::new(Arc::new(streaming), Arc::new(direct))
            .into_router()
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let app = self.app(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → SSE stream:   GET  {}", SSE_PATH);
        info!("  → SSE messages: POST {}?sessionId=<id>", SSE_MESSAGE_PATH);
        info!("  → JSON-RPC:     POST {}", MCP_PATH);

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::{
        body::Body,
        extract::Request,
        http::{Method, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(enable_cors: bool) -> Router {
        let config = HttpConfig {
            enable_cors,
            ..HttpConfig::default()
        };
        HttpTransport::new(config).app(McpServer::new(Config::default()).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let request = Request::builder()
            .uri("/unknown-path")
            .body(Body::empty())
            .unwrap();
        let response = app(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Not found");
    }

    #[tokio::test]
    async fn test_mcp_initialize() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
            ))
            .unwrap();
        let response = app(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["result"]["protocolVersion"], "2025-03-26");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/mcp")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
