//! MCP protocol types (client side)

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 Request
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            method: method.to_string(),
            params,
        }
    }

    /// Notification: a request without an id, expecting no response
    pub fn notification(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Resource handle returned by `resources/list`
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListResourcesResult {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// One content block returned by `resources/read`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub blob: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadResourceResult {
    #[serde(default)]
    pub contents: Vec<ResourceContents>,
}

/// Content block inside a tool call result
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Result of `tools/call`
#[derive(Debug, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    /// Absent on success for most servers
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(7, "resources/list", Value::Null);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["id"], 7);
        assert_eq!(v["method"], "resources/list");
        assert!(v.get("params").is_none());
    }

    #[test]
    fn test_notification_has_no_id() {
        let req = JsonRpcRequest::notification("notifications/initialized", Value::Null);
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("id").is_none());
    }

    #[test]
    fn test_response_with_error() {
        let raw = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": { "code": -32601, "message": "Method not found" }
        });
        let resp: JsonRpcResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.id, Some(3));
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
    }

    #[test]
    fn test_read_resource_result() {
        let raw = json!({
            "contents": [
                { "uri": "doc://a", "mimeType": "text/plain", "text": "hello" },
                { "uri": "doc://b", "mimeType": "image/png", "blob": "aGVsbG8=" }
            ]
        });
        let result: ReadResourceResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.contents.len(), 2);
        assert_eq!(result.contents[0].text.as_deref(), Some("hello"));
        assert!(result.contents[1].text.is_none());
        assert_eq!(result.contents[1].mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_tool_result_ignores_unknown_content() {
        let raw = json!({
            "content": [
                { "type": "text", "text": "found it" },
                { "type": "resource", "resource": { "uri": "x" } }
            ]
        });
        let result: ToolCallResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.content.len(), 2);
        assert!(matches!(result.content[0], ToolContent::Text { .. }));
        assert!(matches!(result.content[1], ToolContent::Other));
    }
}
