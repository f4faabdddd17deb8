//! Tool-specific error types.

use rmcp::ErrorData as McpError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during tool registration and invocation.
///
/// Domain failures (such as dividing by zero) are not represented here:
/// handlers report them as ordinary results whose text describes the error.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A tool with the same name is already registered.
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),

    /// The tool's input schema could not be compiled.
    #[error("Invalid input schema for tool '{tool}': {message}")]
    InvalidSchema { tool: String, message: String },

    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments did not satisfy the tool's input schema.
    #[error("Invalid arguments for tool '{tool}': {}", join_field_errors(.errors))]
    Validation {
        tool: String,
        errors: Vec<FieldError>,
    },
}

/// A single schema violation, located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON pointer to the offending value (`""` for the arguments object itself).
    pub path: String,

    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ToolError {
    /// Create a new "duplicate name" error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new "validation" error.
    pub fn validation(tool: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::Validation {
            tool: tool.into(),
            errors,
        }
    }

    /// Structured details attached to protocol-level error responses.
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            Self::UnknownTool(name) => Some(serde_json::json!({ "tool": name })),
            Self::Validation { tool, errors } => Some(serde_json::json!({
                "tool": tool,
                "errors": errors
            })),
            Self::DuplicateName(_) | Self::InvalidSchema { .. } => None,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let data = err.data();
        match err {
            ToolError::UnknownTool(_) | ToolError::Validation { .. } => {
                McpError::invalid_params(err.to_string(), data)
            }
            ToolError::DuplicateName(_) | ToolError::InvalidSchema { .. } => {
                McpError::internal_error(err.to_string(), data)
            }
        }
    }
}
