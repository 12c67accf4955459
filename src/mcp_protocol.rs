//! MCP JSON-RPC 2.0 Protocol Handler
//!
//! Implements the JSON-RPC 2.0 framing for MCP (Model Context Protocol).
//! Handles request parsing, method routing, and response generation.
//!
//! JSON-RPC 2.0 format:
//! - Request: {"jsonrpc":"2.0","id":1,"method":"tools/list","params":{}}
//! - Notification: {"jsonrpc":"2.0","method":"notifications/initialized"}
//! - Success: {"jsonrpc":"2.0","id":1,"result":{"tools":[]}}
//! - Error: {"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}

// Allow from_str name - we're not implementing FromStr trait as this returns Option, not Result
#![allow(clippy::should_implement_trait)]
// Allow large error variant - JsonRpcResponse needs to carry full error info for JSON-RPC
#![allow(clippy::result_large_err)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp_feedback_tool::{self, ToolCall};

/// JSON-RPC 2.0 version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision answered when the client does not ask for one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "Interactive Feedback MCP";

/// JSON-RPC 2.0 standard error codes
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist / is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// JSON-RPC 2.0 Request or Notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// Must be "2.0"
    pub jsonrpc: String,
    /// Request identifier (string, number, or null). `None` marks a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Method name to invoke
    pub method: String,
    /// Optional parameters
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The id to echo in a response (null for notifications)
    pub fn response_id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// Must be "2.0"
    pub jsonrpc: String,
    /// Request identifier (matches request)
    pub id: Value,
    /// Result on success (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on failure (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP methods supported by this server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpMethod {
    /// Initialize the MCP session
    Initialize,
    /// Liveness check
    Ping,
    /// List available tools
    ToolsList,
    /// Call a specific tool
    ToolsCall,
    /// Client finished initialization
    Initialized,
    /// Client gave up on an in-flight request
    Cancelled,
}

impl McpMethod {
    /// Parse method string to enum variant
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "initialize" => Some(Self::Initialize),
            "ping" => Some(Self::Ping),
            "tools/list" => Some(Self::ToolsList),
            "tools/call" => Some(Self::ToolsCall),
            "notifications/initialized" => Some(Self::Initialized),
            "notifications/cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Get the method string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Ping => "ping",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Initialized => "notifications/initialized",
            Self::Cancelled => "notifications/cancelled",
        }
    }
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// The error code, if this is an error response
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// MCP server capabilities returned by initialize
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCapabilities {
    /// Negotiated protocol revision
    pub protocol_version: String,
    /// Server information
    pub server_info: ServerInfo,
    /// Supported capabilities
    pub capabilities: CapabilitySet,
}

/// Server identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Set of capabilities the server supports
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CapabilitySet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// What the transport loop should do with one inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Write this response now
    Respond(JsonRpcResponse),
    /// Run the tool call on a worker and answer `id` when it finishes
    CallTool { id: Value, call: ToolCall },
    /// Cancel the in-flight request with this id
    Cancel { request_id: Value },
    /// Nothing to do (e.g. `notifications/initialized`)
    Ignore,
}

/// Parse a JSON string into a JsonRpcRequest
pub fn parse_request(json: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    // Try to parse the JSON
    let value: Value = serde_json::from_str(json).map_err(|e| {
        JsonRpcResponse::error(
            Value::Null,
            error_codes::PARSE_ERROR,
            format!("Parse error: {}", e),
        )
    })?;

    if !value.is_object() {
        return Err(JsonRpcResponse::error(
            Value::Null,
            error_codes::INVALID_REQUEST,
            "Request must be a JSON object",
        ));
    }

    let id = value.get("id").cloned();

    // Validate jsonrpc version
    let jsonrpc = value
        .get("jsonrpc")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            JsonRpcResponse::error(
                id.clone().unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                "Missing or invalid 'jsonrpc' field",
            )
        })?;

    if jsonrpc != JSONRPC_VERSION {
        return Err(JsonRpcResponse::error(
            id.unwrap_or(Value::Null),
            error_codes::INVALID_REQUEST,
            format!(
                "Invalid jsonrpc version: expected '{}', got '{}'",
                JSONRPC_VERSION, jsonrpc
            ),
        ));
    }

    let method = value
        .get("method")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            JsonRpcResponse::error(
                id.clone().unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                "Missing 'method' field",
            )
        })?;

    let params = value
        .get("params")
        .cloned()
        .unwrap_or(Value::Object(Default::default()));

    Ok(JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id,
        method: method.to_string(),
        params,
    })
}

/// Decide how to handle a parsed request.
///
/// Everything except `tools/call` is answered inline; tool calls are handed
/// back to the caller because they block on a human.
pub fn route_request(request: JsonRpcRequest) -> Routed {
    let method = McpMethod::from_str(&request.method);

    if request.is_notification() {
        return match method {
            Some(McpMethod::Cancelled) => match request.params.get("requestId") {
                Some(request_id) => Routed::Cancel {
                    request_id: request_id.clone(),
                },
                None => Routed::Ignore,
            },
            // Notifications never get a response, even unknown ones
            _ => Routed::Ignore,
        };
    }

    let id = request.response_id();
    match method {
        Some(McpMethod::Initialize) => Routed::Respond(handle_initialize(id, &request.params)),
        Some(McpMethod::Ping) => Routed::Respond(JsonRpcResponse::success(id, serde_json::json!({}))),
        Some(McpMethod::ToolsList) => Routed::Respond(handle_tools_list(id)),
        Some(McpMethod::ToolsCall) => match parse_tool_call(id.clone(), &request.params) {
            Ok(call) => Routed::CallTool { id, call },
            Err(response) => Routed::Respond(response),
        },
        // Sent with an id by some clients; acknowledge instead of erroring
        Some(McpMethod::Initialized) | Some(McpMethod::Cancelled) => {
            Routed::Respond(JsonRpcResponse::success(id, serde_json::json!({})))
        }
        None => Routed::Respond(JsonRpcResponse::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    }
}

/// Handle initialize request
fn handle_initialize(id: Value, params: &Value) -> JsonRpcResponse {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();

    let capabilities = McpCapabilities {
        protocol_version,
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        capabilities: CapabilitySet {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        },
    };

    match serde_json::to_value(capabilities) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

/// Handle tools/list request
fn handle_tools_list(id: Value) -> JsonRpcResponse {
    let tools = mcp_feedback_tool::tool_definitions();
    let tools_json = serde_json::to_value(&tools).unwrap_or(serde_json::json!([]));

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "tools": tools_json
        }),
    )
}

/// Validate tools/call params: an object with a known tool `name`.
/// `arguments` are accepted and ignored.
fn parse_tool_call(id: Value, params: &Value) -> Result<ToolCall, JsonRpcResponse> {
    let Some(params) = params.as_object() else {
        return Err(JsonRpcResponse::error(
            id,
            error_codes::INVALID_PARAMS,
            "Invalid params: expected object",
        ));
    };

    let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
        return Err(JsonRpcResponse::error(
            id,
            error_codes::INVALID_PARAMS,
            "Missing required parameter: name",
        ));
    };

    if !mcp_feedback_tool::is_known_tool(tool_name) {
        return Err(JsonRpcResponse::error(
            id,
            error_codes::INVALID_PARAMS,
            format!("Unknown tool: {}", tool_name),
        ));
    }

    Ok(ToolCall {
        name: tool_name.to_string(),
        arguments: params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({})),
    })
}
