//! The feedback dialog window.
//!
//! - `options` - checkbox state for predefined options
//! - `window` - the GPUI view, submission and close handling
//!
//! The helpers here are the pieces of the dialog's behaviour that don't need
//! a running GPUI app.

mod options;
mod window;

pub use options::OptionSelection;
pub use window::{
    dialog_window_kind, dialog_window_options, open_feedback_window, DialogOutcome,
    FeedbackDialog, FinishHandler, WINDOW_TITLE,
};

use gpui::{Modifiers, SharedString};

use crate::feedback::{compose_feedback, FeedbackResult};

/// Label of the platform's primary modifier as shown to users
pub fn primary_modifier_label() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd"
    } else {
        "Ctrl"
    }
}

/// Placeholder for the feedback text area
pub fn input_placeholder() -> String {
    format!(
        "Enter your feedback here ({}+Enter to submit)",
        primary_modifier_label()
    )
}

/// Prompt shown above the form; an empty prompt shows nothing.
///
/// Rendered as wrapped read-only text.
pub fn prompt_text(prompt: &str) -> Option<SharedString> {
    if prompt.is_empty() {
        None
    } else {
        Some(SharedString::from(prompt.to_string()))
    }
}

/// True for the submit chord: primary modifier + Enter
pub fn is_submit_chord(key: &str, modifiers: &Modifiers) -> bool {
    let primary = if cfg!(target_os = "macos") {
        modifiers.platform
    } else {
        modifiers.control
    };
    primary && matches!(key, "enter" | "return")
}

/// Build the result record for a submission
pub fn build_result(options: &OptionSelection, text: &str, commit_requested: bool) -> FeedbackResult {
    FeedbackResult::new(compose_feedback(&options.selected(), text))
        .with_commit_requested(commit_requested)
}

/// Text printed when the dialog has no output file
pub fn stdout_report(result: &FeedbackResult) -> String {
    format!("\nFeedback received:\n{}", result.interactive_feedback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_names_modifier() {
        let placeholder = input_placeholder();
        assert!(placeholder.starts_with("Enter your feedback here ("));
        assert!(placeholder.contains(primary_modifier_label()));
        assert!(placeholder.ends_with("+Enter to submit)"));
    }

    #[test]
    fn test_submit_chord() {
        let primary = if cfg!(target_os = "macos") {
            Modifiers {
                platform: true,
                ..Default::default()
            }
        } else {
            Modifiers {
                control: true,
                ..Default::default()
            }
        };

        assert!(is_submit_chord("enter", &primary));
        assert!(!is_submit_chord("enter", &Modifiers::default()));
        assert!(!is_submit_chord("a", &primary));
        assert!(!is_submit_chord(
            "enter",
            &Modifiers {
                shift: true,
                ..Default::default()
            }
        ));
    }

    #[test]
    fn test_build_result_empty() {
        let options = OptionSelection::new(Vec::new());
        let result = build_result(&options, "   ", false);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"interactive_feedback":""}"#
        );
    }

    #[test]
    fn test_build_result_with_commit() {
        let mut options = OptionSelection::new(vec!["Ship it".to_string()]);
        options.toggle(0);
        let result = build_result(&options, "", true);
        assert_eq!(result.interactive_feedback, "Ship it");
        assert_eq!(result.git_commit, Some(true));
    }

    #[test]
    fn test_prompt_hidden_when_empty() {
        assert_eq!(prompt_text(""), None);
        assert_eq!(
            prompt_text("Review complete?").as_ref().map(AsRef::<str>::as_ref),
            Some("Review complete?")
        );
    }

    #[test]
    fn test_stdout_report() {
        let result = FeedbackResult::new("all good");
        assert_eq!(stdout_report(&result), "\nFeedback received:\nall good");
    }
}
