//! JSON-RPC 2.0 message handling shared by the HTTP channels.
//!
//! Both the SSE channel and the direct `/mcp` channel decode the same MCP
//! messages and answer them from the same [`McpServer`]; they only differ in
//! how a response travels back to the client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::core::McpServer;

/// Protocol versions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// JSON-RPC request structure.
///
/// A request without an `id` is a notification and gets no response.
/// An explicit `"id": null` is kept as `Some(Value::Null)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "deserialize_present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }

    /// Parse error (the body is not valid JSON).
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(Value::Null, Self::PARSE_ERROR, msg, None)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Value) -> Self {
        Self::error(id, Self::INVALID_REQUEST, "Invalid Request", None)
    }

    /// Method not found error.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(
            id,
            Self::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
            None,
        )
    }

    /// Invalid params error.
    pub fn invalid_params(id: Value, msg: impl Into<String>, data: Option<Value>) -> Self {
        Self::error(id, Self::INVALID_PARAMS, msg, data)
    }
}

/// What to send back for one HTTP body worth of messages.
#[derive(Debug, Clone)]
pub enum RpcReply {
    /// Only notifications were received.
    Empty,
    /// Response to a single request.
    Single(JsonRpcResponse),
    /// Responses to a batch, in request order.
    Batch(Vec<JsonRpcResponse>),
}

impl RpcReply {
    /// The JSON body for this reply, or `None` when nothing is owed.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Single(response) => serde_json::to_value(response).ok(),
            Self::Batch(responses) => serde_json::to_value(responses).ok(),
        }
    }
}

/// Decode a raw HTTP body and answer every message in it.
///
/// Returns `Err` with a parse-error response when the body is not JSON.
pub fn handle_body(server: &McpServer, body: &[u8]) -> Result<RpcReply, JsonRpcResponse> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected unparsable JSON-RPC body: {}", e);
        JsonRpcResponse::parse_error(format!("Parse error: {}", e))
    })?;

    let reply = match payload {
        Value::Array(messages) if messages.is_empty() => {
            RpcReply::Single(JsonRpcResponse::invalid_request(Value::Null))
        }
        Value::Array(messages) => {
            let responses: Vec<_> = messages
                .into_iter()
                .filter_map(|message| handle_value(server, message))
                .collect();
            if responses.is_empty() {
                RpcReply::Empty
            } else {
                RpcReply::Batch(responses)
            }
        }
        message => match handle_value(server, message) {
            Some(response) => RpcReply::Single(response),
            None => RpcReply::Empty,
        },
    };

    Ok(reply)
}

/// Answer one decoded JSON value.
fn handle_value(server: &McpServer, message: Value) -> Option<JsonRpcResponse> {
    let looks_like_notification = message
        .as_object()
        .is_some_and(|m| !m.contains_key("id") && m.get("method").is_some_and(Value::is_string));
    let id = message.get("id").cloned().unwrap_or(Value::Null);

    match serde_json::from_value::<JsonRpcRequest>(message) {
        Ok(request) => process_request(server, request),
        // Malformed notifications are dropped.
        Err(_) if looks_like_notification => None,
        Err(e) => {
            warn!("Rejected malformed JSON-RPC message: {}", e);
            Some(JsonRpcResponse::invalid_request(id))
        }
    }
}

/// Process a JSON-RPC request and return the response, if one is owed.
#[instrument(skip_all, fields(method = %request.method))]
pub fn process_request(server: &McpServer, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let Some(id) = request.id.clone() else {
        handle_notification(&request);
        return None;
    };

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::invalid_request(id));
    }

    info!("Received JSON-RPC request: {}", request.method);

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(server, id, request.params),
        "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
        "tools/list" => handle_tools_list(server, id),
        "tools/call" => handle_tools_call(server, id, request.params),
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(id, method)
        }
    };

    Some(response)
}

/// Pick the protocol version to answer `initialize` with.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

/// Handle initialize request.
fn handle_initialize(server: &McpServer, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let requested = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let protocol_version = negotiate_protocol_version(requested);
    info!("Initializing session with protocol {}", protocol_version);

    let result = serde_json::json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": server.name(),
            "version": server.version()
        },
        "instructions": server.instructions()
    });

    JsonRpcResponse::success(id, result)
}

/// Handle tools/list request.
fn handle_tools_list(server: &McpServer, id: Value) -> JsonRpcResponse {
    let tools = server.list_tools();
    JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
}

/// Handle tools/call request.
fn handle_tools_call(server: &McpServer, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::invalid_params(id, "Missing params", None);
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(id, "Missing tool name", None);
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match server.call_tool(name, arguments) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, JsonRpcResponse::INTERNAL_ERROR, e.to_string(), None),
        },
        Err(e) => JsonRpcResponse::invalid_params(id, e.to_string(), e.data()),
    }
}

/// Handle notifications (no response).
fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client sent initialized notification"),
        method => info!("Received notification: {}", method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;

    fn server() -> McpServer {
        McpServer::new(Config::default()).unwrap()
    }

    fn call(server: &McpServer, body: Value) -> RpcReply {
        handle_body(server, body.to_string().as_bytes()).unwrap()
    }

    fn single(reply: RpcReply) -> JsonRpcResponse {
        match reply {
            RpcReply::Single(response) => response,
            other => panic!("Expected single response, got {:?}", other),
        }
    }

    #[test]
    fn test_initialize_echoes_supported_version() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "protocolVersion": "2024-11-05", "capabilities": {} }
            }),
        ));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "calculator-mcp-server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2025-03-26")), "2025-03-26");
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), "2025-06-18");
        assert_eq!(negotiate_protocol_version(None), "2025-06-18");
    }

    #[test]
    fn test_tools_list() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" }),
        ));
        assert_eq!(response.id, "a");
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["add", "calculate", "randomBase64Image"]);
        assert!(tools[0]["inputSchema"].is_object());
        assert!(tools[0]["description"].is_string());
    }

    #[test]
    fn test_tools_call_success() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": { "name": "calculate", "arguments": { "operation": "multiply", "a": 6, "b": 7 } }
            }),
        ));
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "42");
        assert_eq!(result["isError"], false);
    }

    #[test]
    fn test_tools_call_divide_by_zero_is_success() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "calculate", "arguments": { "operation": "divide", "a": 1, "b": 0 } }
            }),
        ));
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], "Error: Cannot divide by zero");
    }

    #[test]
    fn test_tools_call_image_content() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": { "name": "randomBase64Image" }
            }),
        ));
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["type"], "image");
        assert_eq!(result["content"][0]["mimeType"], "image/jpeg");
        assert!(result["content"][0]["data"].as_str().unwrap().len() > 100);
    }

    #[test]
    fn test_tools_call_unknown_tool() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": { "name": "sqrt", "arguments": { "a": 4 } }
            }),
        ));
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, JsonRpcResponse::INVALID_PARAMS);
        assert_eq!(error.data.unwrap()["tool"], "sqrt");
    }

    #[test]
    fn test_tools_call_validation_error() {
        let response = single(call(
            &server(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": { "name": "add", "arguments": { "a": true, "b": 1 } }
            }),
        ));
        let error = response.error.unwrap();
        assert_eq!(error.code, JsonRpcResponse::INVALID_PARAMS);
        assert_eq!(error.data.unwrap()["errors"][0]["path"], "/a");
    }

    #[test]
    fn test_tools_call_missing_name() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {} }),
        ));
        assert_eq!(response.error.unwrap().message, "Missing tool name");
    }

    #[test]
    fn test_notification_has_no_reply() {
        let reply = call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        );
        assert!(matches!(reply, RpcReply::Empty));
        assert!(reply.to_json().is_none());
    }

    #[test]
    fn test_unknown_method() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "id": 8, "method": "resources/list" }),
        ));
        assert_eq!(response.error.unwrap().code, JsonRpcResponse::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_wrong_version() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "1.0", "id": 9, "method": "ping" }),
        ));
        assert_eq!(response.error.unwrap().code, JsonRpcResponse::INVALID_REQUEST);
    }

    #[test]
    fn test_batch() {
        let reply = call(
            &server(),
            serde_json::json!([
                { "jsonrpc": "2.0", "id": 1, "method": "ping" },
                { "jsonrpc": "2.0", "method": "notifications/initialized" },
                { "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                  "params": { "name": "add", "arguments": { "a": 1, "b": 2 } } }
            ]),
        );
        match reply {
            RpcReply::Batch(responses) => {
                assert_eq!(responses.len(), 2);
                assert_eq!(responses[0].id, 1);
                assert_eq!(responses[1].result.as_ref().unwrap()["content"][0]["text"], "3");
            }
            other => panic!("Expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_null_id_is_a_request() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "id": null, "method": "ping" }),
        ));
        assert!(response.id.is_null());
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_malformed_messages_are_invalid_requests() {
        for body in [
            serde_json::json!({ "foo": 1 }),
            serde_json::json!("hello"),
            serde_json::json!(1),
            serde_json::json!({ "jsonrpc": "2.0", "method": 1 }),
        ] {
            let response = single(call(&server(), body.clone()));
            let error = response.error.unwrap_or_else(|| panic!("no error for {}", body));
            assert_eq!(error.code, JsonRpcResponse::INVALID_REQUEST);
            assert!(response.id.is_null());
        }
    }

    #[test]
    fn test_malformed_message_keeps_its_id() {
        let response = single(call(
            &server(),
            serde_json::json!({ "jsonrpc": "2.0", "id": 4, "method": ["ping"] }),
        ));
        assert_eq!(response.id, 4);
        assert_eq!(response.error.unwrap().code, JsonRpcResponse::INVALID_REQUEST);
    }

    #[test]
    fn test_batch_of_non_objects() {
        let reply = call(&server(), serde_json::json!([1, 2]));
        match reply {
            RpcReply::Batch(responses) => {
                assert_eq!(responses.len(), 2);
                for response in responses {
                    assert!(response.id.is_null());
                    assert_eq!(response.error.unwrap().code, JsonRpcResponse::INVALID_REQUEST);
                }
            }
            other => panic!("Expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_notification_is_dropped() {
        let reply = call(
            &server(),
            serde_json::json!({ "method": "notifications/initialized" }),
        );
        assert!(matches!(reply, RpcReply::Empty));
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        let response = single(call(&server(), serde_json::json!([])));
        assert_eq!(response.error.unwrap().code, JsonRpcResponse::INVALID_REQUEST);
    }

    #[test]
    fn test_parse_error() {
        let err = handle_body(&server(), b"{not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, JsonRpcResponse::PARSE_ERROR);
        assert!(err.id.is_null());
    }
}
