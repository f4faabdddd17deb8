//! Calculator MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a small set of tools:
//! `add`, `calculate` and `randomBase64Image`.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and the
//!   transports (STDIO, and HTTP with its `/sse` and `/mcp` channels)
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool definitions, schema validation and the registry
//!
//! # Example
//!
//! ```rust,no_run
//! use calculator_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
