#![allow(unexpected_cfgs)]

//! Interactive Feedback - ask the human in the loop from an MCP agent
//!
//! Two binaries share this library:
//! - `interactive-feedback-mcp` serves the `interactive_feedback` tool over
//!   stdio and launches a dialog per call
//! - `feedback-ui` is the dialog; it writes one JSON result file and exits

pub mod config;
pub mod error;
pub mod executor;
pub mod feedback;
pub mod logging;

// MCP stdio server
pub mod mcp_feedback_tool;
pub mod mcp_protocol;
pub mod mcp_server;

// Dialog window
pub mod dialog;
pub mod window_resize;
pub mod window_state;
