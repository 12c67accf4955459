//! `feedback-ui` - the feedback dialog
//!
//! Started by the MCP server with `--output-file`; can also be run by hand,
//! in which case the result is printed to stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gpui::{App, Application};
use parking_lot::Mutex;
use tracing::error;

use interactive_feedback::dialog::{open_feedback_window, DialogOutcome, FinishHandler};
use interactive_feedback::feedback::{parse_predefined_options, FeedbackRequest, DEFAULT_PROMPT};
use interactive_feedback::logging::{self, LogTarget, LoggingGuard};

#[derive(Debug, Parser)]
#[command(name = "feedback-ui", version, about = "Collect feedback from the user")]
struct Cli {
    /// Text shown above the options; empty hides it
    #[arg(long, default_value = DEFAULT_PROMPT, allow_hyphen_values = true)]
    prompt: String,

    /// Options separated by "|||"
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    predefined_options: String,

    /// Where to write the JSON result
    #[arg(long)]
    output_file: Option<PathBuf>,

    #[arg(long, default_value_t = interactive_feedback::config::DEFAULT_FONT_SIZE)]
    font_size: u32,

    /// Show a "Commit these changes" checkbox
    #[arg(long)]
    offer_commit: bool,
}

impl Cli {
    fn into_request(self) -> FeedbackRequest {
        let mut request = FeedbackRequest::new(self.font_size.max(1))
            .with_offer_commit(self.offer_commit);
        request.prompt = self.prompt;
        request.predefined_options = parse_predefined_options(&self.predefined_options);
        request.output_path = self.output_file;
        request
    }
}

/// Flush the log file, then exit without returning to the run loop
fn exit_flushed(guard: &Mutex<Option<LoggingGuard>>, code: i32) -> ! {
    logging::flush(guard);
    std::process::exit(code)
}

fn main() -> ExitCode {
    let request = Cli::parse().into_request();
    let guard = Arc::new(Mutex::new(Some(logging::init(LogTarget::Dialog))));

    let outcome: Arc<Mutex<Option<DialogOutcome>>> = Arc::new(Mutex::new(None));

    let on_finish: FinishHandler = {
        let outcome = outcome.clone();
        let guard = guard.clone();
        Box::new(move |finished: &DialogOutcome| {
            *outcome.lock() = Some(finished.clone());
            let code = finished.exit_code();
            // quit() terminates with success on some platforms
            if code != 0 {
                exit_flushed(&guard, code);
            }
        })
    };

    let guard_for_app = guard.clone();
    Application::new().run(move |cx: &mut App| {
        gpui_component::init(cx);

        if let Err(e) = open_feedback_window(request, on_finish, cx) {
            error!(error = %e, "Failed to open feedback window");
            // The platform run loop may never hand control back to main
            exit_flushed(&guard_for_app, 1);
        }
    });

    let code = outcome
        .lock()
        .as_ref()
        .map(DialogOutcome::exit_code)
        .unwrap_or(0);
    logging::flush(&guard);
    ExitCode::from(code as u8)
}
