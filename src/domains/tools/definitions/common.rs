//! Common utilities shared across tools.
//!
//! This module provides number rendering and result construction helpers.

use rmcp::model::{CallToolResult, Content};
use tracing::warn;

/// Magnitude at and above which numbers switch to exponent notation.
const EXPONENT_UPPER: f64 = 1e21;

/// Magnitude below which non-zero numbers switch to exponent notation.
const EXPONENT_LOWER: f64 = 1e-6;

/// Render a number the way an ECMAScript `String(number)` conversion does.
///
/// Integral values carry no fractional part, digits are the shortest that
/// round-trip, and very large or very small magnitudes use `1e+21` / `1e-7`
/// style exponents.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (EXPONENT_LOWER..EXPONENT_UPPER).contains(&magnitude) {
        return value.to_string();
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}
