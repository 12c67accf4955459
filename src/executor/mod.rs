//! Dialog execution module
//!
//! This module handles launching the feedback dialog as a child process:
//! - Resolving the `feedback-ui` executable
//! - Spawning it in its own process group with a fresh temp output file
//! - Waiting (cancellably) for exit and reading the result record
//! - Killing the process group on cancellation or drop

mod launcher;
mod process;

pub use launcher::{resolve_dialog_program, DialogLauncher};
pub use process::{ProcessHandle, POLL_INTERVAL_MS, TERM_GRACE_MS};
