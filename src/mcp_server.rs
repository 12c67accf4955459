//! MCP stdio server
//!
//! Reads newline-delimited JSON-RPC from stdin and writes responses to stdout.
//! Features:
//! - Inline answers for initialize, ping and tools/list
//! - One worker thread per tools/call, so the loop keeps serving while a human types
//! - `notifications/cancelled` closes the matching dialog
//! - On stdin EOF every in-flight dialog is cancelled and the workers are joined
//!
//! Stdout carries framing only. Diagnostics go through `tracing`.

use crate::executor::DialogLauncher;
use crate::mcp_feedback_tool;
use crate::mcp_protocol::{self, error_codes, JsonRpcResponse, Routed};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

type SharedWriter<W> = Arc<Mutex<W>>;

/// MCP stdio server
///
/// Holds the launcher shared by every call and the table of cancel flags for
/// calls still waiting on a dialog.
pub struct McpServer {
    launcher: Arc<DialogLauncher>,
    in_flight: Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>,
}

impl McpServer {
    pub fn new(launcher: DialogLauncher) -> Self {
        Self {
            launcher: Arc::new(launcher),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        self.run(stdin.lock(), std::io::stdout())
    }

    /// Serve requests from `reader`, writing whole-line responses to `writer`.
    ///
    /// Returns when the reader hits EOF (or fails), after cancelling and
    /// joining every outstanding tool call.
    pub fn run<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write + Send + 'static,
    {
        let writer: SharedWriter<W> = Arc::new(Mutex::new(writer));
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        info!(
            dialog = %self.launcher.program().display(),
            font_size = self.launcher.font_size(),
            "MCP stdio server started"
        );

        let outcome = self.serve_lines(reader, &writer, &mut workers);

        let pending = self.cancel_all();
        if pending > 0 {
            info!(pending, "Input closed, cancelling in-flight feedback requests");
        }
        for worker in workers {
            if worker.join().is_err() {
                error!("Feedback worker panicked");
            }
        }

        info!("MCP stdio server stopped");
        outcome
    }

    fn serve_lines<R, W>(
        &self,
        mut reader: R,
        writer: &SharedWriter<W>,
        workers: &mut Vec<JoinHandle<()>>,
    ) -> Result<()>
    where
        R: BufRead,
        W: Write + Send + 'static,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "stdin read error");
                    break;
                }
            }

            // A line that isn't UTF-8 is a bad message, not a broken transport
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!(bytes = buf.len(), "Rejected non-UTF-8 JSON-RPC message");
                    write_response(
                        writer,
                        &JsonRpcResponse::error(
                            Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", e),
                        ),
                    )?;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let request = match mcp_protocol::parse_request(line) {
                Ok(request) => request,
                Err(response) => {
                    warn!(line = %line, "Rejected malformed JSON-RPC message");
                    write_response(writer, &response)?;
                    continue;
                }
            };
            debug!(method = %request.method, id = ?request.id, "JSON-RPC message received");

            match mcp_protocol::route_request(request) {
                Routed::Respond(response) => write_response(writer, &response)?,
                Routed::CallTool { id, call } => {
                    let key = request_key(&id);
                    let cancel = Arc::new(AtomicBool::new(false));
                    {
                        let mut in_flight = self.in_flight.lock();
                        if in_flight.contains_key(&key) {
                            drop(in_flight);
                            write_response(
                                writer,
                                &JsonRpcResponse::error(
                                    id,
                                    error_codes::INVALID_REQUEST,
                                    "A request with this id is already in flight",
                                ),
                            )?;
                            continue;
                        }
                        in_flight.insert(key.clone(), Arc::clone(&cancel));
                    }

                    let launcher = Arc::clone(&self.launcher);
                    let in_flight = Arc::clone(&self.in_flight);
                    let writer = Arc::clone(writer);
                    let spawned = thread::Builder::new()
                        .name(format!("feedback-{}", key))
                        .spawn(move || {
                            let response =
                                mcp_feedback_tool::handle_tool_call(id, &call, &launcher, &cancel);
                            in_flight.lock().remove(&key);
                            let Some(response) = response else {
                                debug!(request = %key, "Cancelled call left unanswered");
                                return;
                            };
                            if let Err(e) = write_response(&writer, &response) {
                                error!(error = %e, "Failed to write tool response");
                            }
                        })
                        .context("Failed to spawn feedback worker thread")?;

                    workers.retain(|worker| !worker.is_finished());
                    workers.push(spawned);
                }
                Routed::Cancel { request_id } => {
                    if self.cancel(&request_id) {
                        info!(request_id = %request_id, "Cancellation requested");
                    } else {
                        debug!(request_id = %request_id, "Cancellation for unknown request ignored");
                    }
                }
                Routed::Ignore => {}
            }
        }
        Ok(())
    }

    /// Flag the in-flight call with this id for cancellation.
    /// Returns false if no such call is running.
    pub fn cancel(&self, request_id: &Value) -> bool {
        match self.in_flight.lock().get(&request_key(request_id)) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Flag every in-flight call; returns how many were flagged
    pub fn cancel_all(&self) -> usize {
        let in_flight = self.in_flight.lock();
        for flag in in_flight.values() {
            flag.store(true, Ordering::SeqCst);
        }
        in_flight.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// Table key for a JSON-RPC id. The JSON encoding keeps `1` and `"1"` apart.
fn request_key(id: &Value) -> String {
    id.to_string()
}

/// Write one response as a single line and flush
fn write_response<W: Write>(writer: &Mutex<W>, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response).context("Failed to serialize response")?;
    let mut writer = writer.lock();
    writeln!(writer, "{}", json).context("Failed to write response")?;
    writer.flush().context("Failed to flush response")?;
    Ok(())
}
