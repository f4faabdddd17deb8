//! Calculator tool definition.
//!
//! A four-function calculator over two numbers. Division by zero is reported
//! as a regular text result, not as a protocol error.

use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{format_number, success_result};
use crate::domains::tools::{ToolError, ToolRegistry};

/// Message returned when dividing by zero.
pub const DIVIDE_BY_ZERO_MESSAGE: &str = "Error: Cannot divide by zero";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Arithmetic operation supported by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Apply the operation, or `None` when dividing by zero.
    pub fn apply(self, a: f64, b: f64) -> Option<f64> {
        match self {
            Self::Add => Some(a + b),
            Self::Subtract => Some(a - b),
            Self::Multiply => Some(a * b),
            Self::Divide if b == 0.0 => None,
            Self::Divide => Some(a / b),
        }
    }
}

/// Parameters for the calculator tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculateParams {
    /// The operation to perform: add, subtract, multiply, or divide.
    pub operation: Operation,

    /// The first number for the operation.
    pub a: f64,

    /// The second number for the operation.
    pub b: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Calculator tool - performs one arithmetic operation on two numbers.
pub struct CalculateTool;

impl CalculateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "calculate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Performs a calculation (add, subtract, multiply, divide) on two numbers.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(operation = ?params.operation))]
    pub fn execute(params: &CalculateParams) -> CallToolResult {
        info!("Calculate tool called");

        match params.operation.apply(params.a, params.b) {
            Some(value) => success_result(format_number(value)),
            None => {
                info!("Division by zero requested");
                success_result(DIVIDE_BY_ZERO_MESSAGE.to_string())
            }
        }
    }

    /// Register this tool with the registry.
    pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register_typed::<CalculateParams, _>(
            Self::NAME,
            Self::DESCRIPTION,
            Self::execute,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn run(operation: Operation, a: f64, b: f64) -> String {
        let result = CalculateTool::execute(&CalculateParams { operation, a, b });
        assert_eq!(result.is_error, Some(false));
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_basic_operations() {
        assert_eq!(run(Operation::Add, 4.0, 2.0), "6");
        assert_eq!(run(Operation::Subtract, 4.0, 6.0), "-2");
        assert_eq!(run(Operation::Multiply, 1.5, 4.0), "6");
        assert_eq!(run(Operation::Divide, 7.0, 2.0), "3.5");
    }

    #[test]
    fn test_divide_repeating_fraction() {
        assert_eq!(run(Operation::Divide, 1.0, 3.0), "0.3333333333333333");
    }

    #[test]
    fn test_divide_by_zero() {
        for a in [0.0, 1.0, -5.5, 1e300] {
            assert_eq!(run(Operation::Divide, a, 0.0), DIVIDE_BY_ZERO_MESSAGE);
            assert_eq!(run(Operation::Divide, a, -0.0), DIVIDE_BY_ZERO_MESSAGE);
        }
    }

    #[test]
    fn test_multiply_overflow() {
        assert_eq!(run(Operation::Multiply, 1e200, 1e200), "Infinity");
    }

    #[test]
    fn test_operation_deserialize() {
        let params: CalculateParams = serde_json::from_value(serde_json::json!({
            "operation": "subtract",
            "a": 10,
            "b": 4.5
        }))
        .unwrap();
        assert_eq!(params.operation, Operation::Subtract);
        assert_eq!(run(params.operation, params.a, params.b), "5.5");

        let bad = serde_json::from_value::<CalculateParams>(serde_json::json!({
            "operation": "Divide",
            "a": 1,
            "b": 2
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_apply() {
        assert_eq!(Operation::Divide.apply(9.0, 3.0), Some(3.0));
        assert_eq!(Operation::Divide.apply(9.0, 0.0), None);
        assert_eq!(Operation::Subtract.apply(0.0, 0.0), Some(0.0));
    }
}
