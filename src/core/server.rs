//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler. It owns the tool registry
//! and exposes it two ways:
//! - as an rmcp `ServerHandler` (STDIO transport), through a `ToolRouter`
//!   built from the registry;
//! - as plain list/call methods used by the HTTP channels.
//!
//! Tools are defined in `domains/tools/definitions/` and registered in
//! `ToolRegistry::with_defaults`. Adding a new tool does not require
//! modifying this file.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::tools::{ToolError, ToolRegistry, build_tool_router};

const INSTRUCTIONS: &str = "This server provides calculator tools: `add` sums two numbers and \
    `calculate` applies add, subtract, multiply or divide to two numbers. \
    `randomBase64Image` returns a random JPEG when enabled.";

/// The main MCP server handler.
///
/// Cloning is cheap; clones share the same immutable registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registry of all available tools.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the built-in tools enabled by `config`.
    ///
    /// Fails if two tools are registered under the same name.
    pub fn new(config: Config) -> CoreResult<Self> {
        let registry = ToolRegistry::with_defaults(&config.tools)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a new MCP server around an already populated registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        info!("Server ready with tools: {:?}", registry.tool_names());

        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the usage instructions sent to clients on initialization.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        self.registry.invoke(name, arguments)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
