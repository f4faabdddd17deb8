//! Addition tool definition.
//!
//! A tool that adds two numbers together.

use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{format_number, success_result};
use crate::domains::tools::{ToolError, ToolRegistry};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the addition tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddParams {
    /// The first number to add.
    pub a: f64,

    /// The second number to add.
    pub b: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Addition tool - returns the sum of two numbers as text.
pub struct AddTool;

impl AddTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "add";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Adds two numbers together and returns the result.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(a = params.a, b = params.b))]
    pub fn execute(params: &AddParams) -> CallToolResult {
        info!("Add tool called");
        success_result(format_number(params.a + params.b))
    }

    /// Register this tool with the registry.
    pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register_typed::<AddParams, _>(Self::NAME, Self::DESCRIPTION, Self::execute)
    }
}

// ============================================================================
// Tests
// ============================================================================
