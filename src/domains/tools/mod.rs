//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to perform
//! specific computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `registry.rs` - Tool registry: schemas, validation and dispatch
//! - `router.rs` - rmcp ToolRouter built from the registry (STDIO transport)
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define a params struct deriving `Deserialize` + `JsonSchema`,
//!    an `execute()` function and a `register()` function
//! 3. Export it in `definitions/mod.rs`
//! 4. Call its `register()` from `ToolRegistry::with_defaults`
//!
//! Both transports pick the tool up from the registry.

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::{FieldError, ToolError};
pub use registry::{ToolHandler, ToolRegistry};
pub use router::build_tool_router;
