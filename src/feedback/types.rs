use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

use super::compose::join_predefined_options;
use crate::config::DEFAULT_FONT_SIZE;

/// Prompt shown when the dialog is started without `--prompt`
pub const DEFAULT_PROMPT: &str = "I implemented the changes you requested.";

/// Everything the dialog needs to render one feedback form.
///
/// Built by the bridge per invocation and handed over as argv; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub prompt: String,
    pub predefined_options: Vec<String>,
    pub font_size: u32,
    pub output_path: Option<PathBuf>,
    pub offer_commit: bool,
}

impl Default for FeedbackRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            predefined_options: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
            output_path: None,
            offer_commit: false,
        }
    }
}

impl FeedbackRequest {
    pub fn new(font_size: u32) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_offer_commit(mut self, offer_commit: bool) -> Self {
        self.offer_commit = offer_commit;
        self
    }

    /// Command-line arguments understood by the `feedback-ui` binary.
    ///
    /// `--prompt` and `--predefined-options` are always present, even when
    /// empty, so the dialog never falls back to its own defaults.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--prompt".into(), self.prompt.clone().into()];
        if let Some(path) = &self.output_path {
            args.push("--output-file".into());
            args.push(path.clone().into_os_string());
        }
        args.push("--predefined-options".into());
        args.push(join_predefined_options(&self.predefined_options).into());
        args.push("--font-size".into());
        args.push(self.font_size.to_string().into());
        if self.offer_commit {
            args.push("--offer-commit".into());
        }
        args
    }
}

/// The one record a dialog produces.
///
/// Serialized as `{"interactive_feedback": "...", "git_commit": true}`; the
/// `git_commit` key is only present when the user ticked the commit box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub interactive_feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<bool>,
}

impl FeedbackResult {
    pub fn new(interactive_feedback: impl Into<String>) -> Self {
        Self {
            interactive_feedback: interactive_feedback.into(),
            git_commit: None,
        }
    }

    /// Record produced when the window closes without a submission
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_commit_requested(mut self, requested: bool) -> Self {
        self.git_commit = requested.then_some(true);
        self
    }

    /// A missing or null `git_commit` reads as false
    pub fn wants_commit(&self) -> bool {
        self.git_commit.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(request: &FeedbackRequest) -> Vec<String> {
        request
            .to_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_bridge_request_args() {
        let request = FeedbackRequest::new(14).with_output_path("/tmp/feedback-abc.json");
        assert_eq!(
            args_as_strings(&request),
            vec![
                "--prompt",
                "",
                "--output-file",
                "/tmp/feedback-abc.json",
                "--predefined-options",
                "",
                "--font-size",
                "14",
            ]
        );
    }

    #[test]
    fn test_offer_commit_adds_flag() {
        let request = FeedbackRequest::new(12).with_offer_commit(true);
        let args = args_as_strings(&request);
        assert_eq!(args.last().map(String::as_str), Some("--offer-commit"));
        assert!(!args.contains(&"--output-file".to_string()));
    }

    #[test]
    fn test_options_are_joined_with_delimiter() {
        let request = FeedbackRequest {
            prompt: "Review complete?".to_string(),
            predefined_options: vec!["Looks good".to_string(), "Needs changes".to_string()],
            ..Default::default()
        };
        let args = args_as_strings(&request);
        let idx = args
            .iter()
            .position(|a| a == "--predefined-options")
            .unwrap();
        assert_eq!(args[idx + 1], "Looks good|||Needs changes");
        assert_eq!(args[1], "Review complete?");
    }

    #[test]
    fn test_result_without_commit_omits_key() {
        let result = FeedbackResult::new("ok");
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"interactive_feedback":"ok"}"#
        );
    }

    #[test]
    fn test_result_with_commit() {
        let result = FeedbackResult::new("ship it").with_commit_requested(true);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"interactive_feedback":"ship it","git_commit":true}"#
        );
        assert!(result.wants_commit());

        let unchecked = FeedbackResult::new("ship it").with_commit_requested(false);
        assert_eq!(unchecked.git_commit, None);
    }

    #[test]
    fn test_result_reader_is_lenient() {
        let result: FeedbackResult =
            serde_json::from_str(r#"{"interactive_feedback":"x","git_commit":null,"extra":1}"#)
                .unwrap();
        assert_eq!(result.interactive_feedback, "x");
        assert!(!result.wants_commit());
    }

    #[test]
    fn test_result_requires_feedback_key() {
        assert!(serde_json::from_str::<FeedbackResult>(r#"{"git_commit":true}"#).is_err());
    }
}
