//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod add;
pub mod calculate;
pub mod common;
pub mod random_image;

pub use add::{AddParams, AddTool};
pub use calculate::{CalculateParams, CalculateTool, Operation};
pub use random_image::{RandomImageParams, RandomImageTool};
