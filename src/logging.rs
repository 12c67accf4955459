//! Structured JSONL logging to a file plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (`~/.interactive-feedback/logs/<binary>.jsonl`) - structured, machine readable
//! - **Compact to stderr** - human-readable for developers
//!
//! Nothing is ever written to stdout. The bridge speaks MCP over stdout, so a
//! single stray line there corrupts the transport.
//!
//! # Usage
//!
//! ```rust,ignore
//! use interactive_feedback::logging::{self, LogTarget};
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init(LogTarget::Bridge);
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "tool_call", "Feedback requested");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2025-01-05T10:30:45.123Z","level":"INFO","target":"interactive_feedback::executor","fields":{"message":"Dialog exited","code":0}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Which binary is logging. Decides the log file name and how chatty stderr is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The MCP stdio service
    Bridge,
    /// The feedback window
    Dialog,
}

impl LogTarget {
    /// Log file name inside the log directory
    pub fn file_name(&self) -> &'static str {
        match self {
            LogTarget::Bridge => "interactive-feedback-mcp.jsonl",
            LogTarget::Dialog => "feedback-ui.jsonl",
        }
    }

    /// Default filter for the JSONL file
    fn file_filter(&self) -> &'static str {
        "info,gpui=warn,gpui_component=warn"
    }

    /// Default filter for stderr.
    /// MCP clients surface server stderr to users, so the bridge stays quiet.
    fn stderr_filter(&self) -> &'static str {
        match self {
            LogTarget::Bridge => "warn",
            LogTarget::Dialog => "info,gpui=warn,gpui_component=warn",
        }
    }
}

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Drop the guard held in `slot`, flushing buffered lines to the log file.
///
/// `std::process::exit` skips destructors; call this first. Returns false if
/// the guard was already gone.
pub fn flush(slot: &parking_lot::Mutex<Option<LoggingGuard>>) -> bool {
    slot.lock().take().is_some()
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Dropping the guard will flush remaining logs and close the file.
/// `RUST_LOG` overrides both default filters.
pub fn init(target: LogTarget) -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(target.file_name());

    // Open log file with append mode, falling back to a sink so logging never
    // takes the process down
    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    // Non-blocking writer so the UI thread and the transport loop never wait on disk
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(target.file_filter()));
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(target.stderr_filter()));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(file_filter);

    // stderr is shown verbatim by MCP clients; no ANSI escapes there
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(target == LogTarget::Dialog)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact()
        .with_filter(stderr_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        target = ?target,
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.interactive-feedback/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".interactive-feedback").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("interactive-feedback-logs"))
}

/// Get the path to the JSONL log file for a binary
pub fn log_path(target: LogTarget) -> PathBuf {
    get_log_dir().join(target.file_name())
}

/// Category-tagged info log.
///
/// Prefer using tracing macros directly for structured fields:
/// ```rust
/// tracing::info!(category = "UI", duration_ms = 42, "Button clicked");
/// ```
pub fn log(category: &str, message: &str) {
    tracing::info!(category = category, "{}", message);
}

/// Debug-only logging - compiled out in release builds
#[cfg(debug_assertions)]
pub fn log_debug(category: &str, message: &str) {
    tracing::debug!(category = category, "{}", message);
}

#[cfg(not(debug_assertions))]
pub fn log_debug(_category: &str, _message: &str) {}

/// Log a UI event with structured fields
pub fn log_ui_event(component: &str, action: &str, details: Option<&str>) {
    let msg = match details {
        Some(d) => format!("{} {} - {}", component, action, d),
        None => format!("{} {}", component, action),
    };

    tracing::info!(
        event_type = "ui_event",
        component = component,
        action = action,
        details = details,
        "{}",
        msg
    );
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}",
        msg
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_names_are_distinct() {
        assert_ne!(
            LogTarget::Bridge.file_name(),
            LogTarget::Dialog.file_name()
        );
        assert!(LogTarget::Bridge.file_name().ends_with(".jsonl"));
    }

    #[test]
    fn test_log_path_lives_in_log_dir() {
        let path = log_path(LogTarget::Dialog);
        assert!(path.ends_with("feedback-ui.jsonl"));
        assert!(path
            .parent()
            .map(|p| p.ends_with("logs") || p.ends_with("interactive-feedback-logs"))
            .unwrap_or(false));
    }

    #[test]
    fn test_bridge_stderr_is_quiet_by_default() {
        assert_eq!(LogTarget::Bridge.stderr_filter(), "warn");
        assert!(LogTarget::Dialog.stderr_filter().starts_with("info"));
    }

    #[test]
    fn test_flush_writes_buffered_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialog.jsonl");
        let file = std::fs::File::create(&path).unwrap();
        let (mut writer, file_guard) = tracing_appender::non_blocking(file);
        let slot = parking_lot::Mutex::new(Some(LoggingGuard {
            _file_guard: file_guard,
        }));

        writer.write_all(b"{\"level\":\"ERROR\"}\n").unwrap();
        assert!(flush(&slot));
        assert!(!flush(&slot));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("ERROR"));
    }

    #[test]
    fn test_helpers_do_not_panic_without_subscriber() {
        log("TEST", "plain message");
        log_debug("TEST", "debug message");
        log_ui_event("Dialog", "opened", None);
        log_error("TEST", "boom", Some("unit test"));
    }
}
