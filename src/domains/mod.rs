//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: the calculator and image tools, their schemas and registry
pub mod tools;
