//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - An ordered registry of tool definitions (name, description, schema, handler)
//! - Schema validation of raw arguments before any handler runs
//! - Tool metadata for listing
//!
//! The registry is built once at startup and is read-only afterwards, so it
//! can be shared freely across concurrent requests behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::{Draft, JSONSchema};
use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::definitions::{AddTool, CalculateTool, RandomImageTool};
use super::error::{FieldError, ToolError};
use crate::core::config::ToolsConfig;

/// Handler invoked with arguments that already satisfy the tool's schema.
pub type ToolHandler = Arc<dyn Fn(JsonObject) -> Result<CallToolResult, ToolError> + Send + Sync>;

struct RegisteredTool {
    tool: Tool,
    validator: JSONSchema,
    handler: ToolHandler,
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in tool enabled by `config`.
    pub fn with_defaults(config: &ToolsConfig) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        AddTool::register(&mut registry)?;
        CalculateTool::register(&mut registry)?;
        if config.enable_random_image {
            RandomImageTool::register(&mut registry)?;
        }
        info!("Registered {} tools", registry.len());
        Ok(registry)
    }

    /// Register a tool from its raw parts.
    ///
    /// Fails with [`ToolError::DuplicateName`] if `name` is taken, or
    /// [`ToolError::InvalidSchema`] if `input_schema` does not compile.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Arc<JsonObject>,
        handler: ToolHandler,
    ) -> Result<(), ToolError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            warn!("Rejected duplicate tool registration: {}", name);
            return Err(ToolError::duplicate_name(name));
        }

        let validator = compile_schema(&name, &input_schema)?;

        debug!("Registering tool: {}", name);
        let description: String = description.into();
        let tool = Tool {
            name: name.clone().into(),
            description: Some(description.into()),
            input_schema,
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        };

        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            tool,
            validator,
            handler,
        });
        Ok(())
    }

    /// Register a tool whose parameters are described by a typed struct.
    ///
    /// The input schema is generated from `P`, and validated arguments are
    /// deserialized into `P` before `handler` is called.
    pub fn register_typed<P, F>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> Result<(), ToolError>
    where
        P: JsonSchema + DeserializeOwned + 'static,
        F: Fn(&P) -> CallToolResult + Send + Sync + 'static,
    {
        let tool_name = name.to_string();
        let handler: ToolHandler = Arc::new(move |arguments: JsonObject| {
            let params: P = serde_json::from_value(serde_json::Value::Object(arguments))
                .map_err(|e| {
                    ToolError::validation(&tool_name, vec![FieldError::new("", e.to_string())])
                })?;
            Ok(handler(&params))
        });

        self.register(name, description, cached_schema_for_type::<P>(), handler)
    }

    /// Invoke a tool by name with unvalidated arguments.
    ///
    /// A missing or `null` argument value is treated as an empty object.
    /// The handler's result is returned unchanged, including results that
    /// describe a domain error.
    pub fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| {
                warn!("Unknown tool requested: {}", name);
                ToolError::unknown_tool(name)
            })?;

        let arguments = match arguments {
            serde_json::Value::Null => serde_json::Value::Object(JsonObject::new()),
            other => other,
        };

        if let Err(errors) = entry.validator.validate(&arguments) {
            let errors: Vec<FieldError> = errors
                .map(|e| FieldError::new(e.instance_path.to_string(), e.to_string()))
                .collect();
            warn!("Validation failed for tool {}: {} error(s)", name, errors.len());
            return Err(ToolError::validation(name, errors));
        }

        let serde_json::Value::Object(arguments) = arguments else {
            // Handlers take an object even when a raw schema admits other shapes.
            return Err(ToolError::validation(
                name,
                vec![FieldError::new("", "arguments must be an object")],
            ));
        };

        (entry.handler)(arguments)
    }

    /// Get all tools as Tool models (metadata), in registration order.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    /// Look up a tool's metadata by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i].tool)
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.tool.name.as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn compile_schema(name: &str, schema: &JsonObject) -> Result<JSONSchema, ToolError> {
    let mut schema = schema.clone();
    schema.remove("$schema");
    let schema = serde_json::Value::Object(schema);

    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| ToolError::InvalidSchema {
            tool: name.to_string(),
            message: e.to_string(),
        })?;
    Ok(validator)
}
