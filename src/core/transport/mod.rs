//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: Standard input/output served by rmcp - feature: `stdio`
//! - **HTTP**: SSE channel (`/sse`, `/sse/message`) and direct JSON-RPC
//!   channel (`/mcp`) behind a path router - feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the MCP server handler.
//!
//! # Feature Flags
//!
//! - `stdio` (default): STDIO transport - minimal dependencies
//! - `http` (default): HTTP transport - adds axum, tower, tower-http

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod direct;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod jsonrpc;
#[cfg(feature = "http")]
pub mod router;
#[cfg(feature = "http")]
pub mod sse;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
#[cfg(feature = "http")]
pub use router::{ProtocolAdapter, Route, TransportRouter};
