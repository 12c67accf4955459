//! The `interactive_feedback` MCP tool
//!
//! Definition for tools/list and the tools/call handler that runs the dialog
//! and turns its outcome into an MCP tool result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::AtomicBool;

use crate::error::FeedbackError;
use crate::executor::DialogLauncher;
use crate::feedback::FeedbackResult;
use crate::mcp_protocol::{error_codes, JsonRpcResponse};

/// Name clients use to invoke the tool
pub const FEEDBACK_TOOL_NAME: &str = "interactive_feedback";

/// Description shown in tools/list
pub const FEEDBACK_TOOL_DESCRIPTION: &str = "Request interactive feedback from the user";

/// Tool definition for MCP tools/list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// A validated tools/call request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// Accepted for compatibility; the feedback tool takes no parameters
    pub arguments: Value,
}

/// Result of a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content item in tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

impl ToolResult {
    /// Successful result carrying the feedback record as text and structured content
    pub fn from_feedback(result: &FeedbackResult) -> Self {
        let text = serde_json::to_string(result).unwrap_or_default();
        Self {
            content: vec![ToolContent::text(text)],
            structured_content: serde_json::to_value(result).ok(),
            is_error: None,
        }
    }

    /// Tool-level failure; the agent sees the message, the session stays up
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            structured_content: None,
            is_error: Some(true),
        }
    }
}

/// Returns the tool definitions for tools/list
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: FEEDBACK_TOOL_NAME.to_string(),
        description: FEEDBACK_TOOL_DESCRIPTION.to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }]
}

/// Check if a tool name is served here
pub fn is_known_tool(name: &str) -> bool {
    name == FEEDBACK_TOOL_NAME
}

/// Convert a finished feedback request into the JSON-RPC answer.
///
/// Dialog failures become `isError` tool results. A cancelled request gets
/// no answer at all: the client has already given up on it.
pub fn feedback_response(
    id: Value,
    outcome: Result<FeedbackResult, FeedbackError>,
) -> Option<JsonRpcResponse> {
    let tool_result = match outcome {
        Ok(result) => ToolResult::from_feedback(&result),
        Err(FeedbackError::Cancelled) => return None,
        Err(e) => ToolResult::error(e.to_string()),
    };

    Some(match serde_json::to_value(tool_result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    })
}

/// Run a tools/call to completion on the current thread.
/// Returns `None` when the call was cancelled.
pub fn handle_tool_call(
    id: Value,
    call: &ToolCall,
    launcher: &DialogLauncher,
    cancel: &AtomicBool,
) -> Option<JsonRpcResponse> {
    if !is_known_tool(&call.name) {
        return Some(JsonRpcResponse::error(
            id,
            error_codes::INVALID_PARAMS,
            format!("Unknown tool: {}", call.name),
        ));
    }

    let outcome = launcher.request_feedback(cancel);
    match &outcome {
        Ok(result) => tracing::info!(
            event_type = "tool_call",
            tool = FEEDBACK_TOOL_NAME,
            chars = result.interactive_feedback.chars().count(),
            git_commit = result.wants_commit(),
            "Feedback collected"
        ),
        Err(e) => tracing::warn!(
            event_type = "tool_call",
            tool = FEEDBACK_TOOL_NAME,
            error = %e,
            launch_failure = e.is_launch_failure(),
            exit_code = ?e.exit_code(),
            "Feedback request failed"
        ),
    }
    feedback_response(id, outcome)
}
