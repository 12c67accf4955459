//! Dialog launching and the temp-file hand-off.
//!
//! One call = one temp file, one child, one read. The temp file is removed on
//! every exit path, including cancellation.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

use super::process::{ProcessHandle, POLL_INTERVAL_MS};
use crate::config::{Config, DIALOG_BINARY_NAME};
use crate::error::{FeedbackError, Result};
use crate::feedback::{append_commit_instruction, read_result, FeedbackRequest, FeedbackResult};

/// Spawns `feedback-ui` and collects its result.
///
/// Everything here is fixed at construction; nothing is mutated per call, so
/// one launcher is shared by every worker thread.
#[derive(Debug, Clone)]
pub struct DialogLauncher {
    program: PathBuf,
    font_size: u32,
    temp_dir: PathBuf,
    offer_commit: bool,
}

impl DialogLauncher {
    pub fn new(program: impl Into<PathBuf>, font_size: u32) -> Self {
        Self {
            program: program.into(),
            font_size,
            temp_dir: std::env::temp_dir(),
            offer_commit: false,
        }
    }

    /// Build a launcher from config, with CLI overrides taking precedence
    pub fn from_config(
        config: &Config,
        dialog_override: Option<PathBuf>,
        font_size_override: Option<u32>,
    ) -> Self {
        let font_size = font_size_override
            .filter(|size| *size > 0)
            .unwrap_or_else(|| config.get_font_size());

        Self::new(resolve_dialog_program(dialog_override, config), font_size)
            .with_temp_dir(config.get_temp_dir())
            .with_offer_commit(config.get_offer_commit())
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_offer_commit(mut self, offer_commit: bool) -> Self {
        self.offer_commit = offer_commit;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Run one feedback round trip and return the result the caller sees.
    ///
    /// When the user ticked the commit box, the commit instruction is
    /// appended to `interactive_feedback`.
    pub fn request_feedback(&self, cancel: &AtomicBool) -> Result<FeedbackResult> {
        let mut result = self.launch(cancel)?;
        if result.wants_commit() {
            result.interactive_feedback = append_commit_instruction(&result.interactive_feedback);
        }
        Ok(result)
    }

    /// Run the dialog and return its raw record
    #[instrument(skip(self, cancel), fields(program = %self.program.display()))]
    pub fn launch(&self, cancel: &AtomicBool) -> Result<FeedbackResult> {
        let temp_path = tempfile::Builder::new()
            .prefix("feedback-")
            .suffix(".json")
            .tempfile_in(&self.temp_dir)
            .map_err(FeedbackError::TempFile)?
            .into_temp_path();

        let outcome = self.run_dialog(&temp_path, cancel);

        let path_display = temp_path.display().to_string();
        if let Err(e) = temp_path.close() {
            // The dialog may have already replaced or removed it
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path_display, error = %e, "Failed to remove feedback temp file");
            }
        }

        outcome
    }

    fn run_dialog(&self, output_path: &Path, cancel: &AtomicBool) -> Result<FeedbackResult> {
        let request = FeedbackRequest::new(self.font_size)
            .with_output_path(output_path)
            .with_offer_commit(self.offer_commit);

        let mut command = Command::new(&self.program);
        command
            .args(request.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // New process group so cancellation reaches everything the dialog forks
        #[cfg(unix)]
        {
            command.process_group(0);
        }

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| FeedbackError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let mut handle = ProcessHandle::new(child.id());
        info!(pid = child.id(), output = %output_path.display(), "Feedback dialog spawned");

        let status = self.wait_for_exit(&mut child, &mut handle, cancel)?;
        info!(
            pid = handle.pid(),
            code = ?status.code(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Feedback dialog exited"
        );

        if !status.success() {
            return Err(FeedbackError::Launch {
                code: status.code(),
            });
        }

        let result = read_result(output_path)?;
        debug!(
            chars = result.interactive_feedback.chars().count(),
            git_commit = result.wants_commit(),
            "Feedback result read"
        );
        Ok(result)
    }

    /// Poll the child until it exits or the request is cancelled
    fn wait_for_exit(
        &self,
        child: &mut Child,
        handle: &mut ProcessHandle,
        cancel: &AtomicBool,
    ) -> Result<ExitStatus> {
        let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
        loop {
            let polled = child.try_wait().map_err(|source| FeedbackError::Spawn {
                program: self.program.clone(),
                source,
            })?;
            if let Some(status) = polled {
                return Ok(status);
            }

            if cancel.load(Ordering::SeqCst) {
                info!(pid = handle.pid(), "Feedback request cancelled, closing dialog");
                handle.kill();
                #[cfg(not(unix))]
                {
                    let _ = child.kill();
                }
                let _ = child.wait();
                return Err(FeedbackError::Cancelled);
            }

            std::thread::sleep(poll_interval);
        }
    }
}

/// Find the dialog executable.
///
/// Order: explicit override, `dialogPath` from config, a `feedback-ui` next
/// to the running executable, then PATH. Falls back to the bare name so the
/// spawn error names what was looked for.
pub fn resolve_dialog_program(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Some(path) = config.get_dialog_path() {
        return path;
    }

    let sibling = std::env::current_exe().ok().and_then(|exe| {
        let candidate = exe
            .parent()?
            .join(format!("{}{}", DIALOG_BINARY_NAME, std::env::consts::EXE_SUFFIX));
        candidate.is_file().then_some(candidate)
    });
    if let Some(path) = sibling {
        return path;
    }

    match which::which(DIALOG_BINARY_NAME) {
        Ok(path) => path,
        Err(e) => {
            warn!(
                binary = DIALOG_BINARY_NAME,
                error = %e,
                "Dialog executable not found next to the bridge or on PATH"
            );
            PathBuf::from(DIALOG_BINARY_NAME)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Shell prelude shared by the fake dialogs: sets $out from --output-file
    /// and records the path it was given in `seen_path` next to the script.
    const PRELUDE: &str = r#"#!/bin/sh
here="$(dirname "$0")"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output-file) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf '%s' "$out" > "$here/seen_path"
"#;

    struct FakeDialog {
        dir: TempDir,
        temp_dir: TempDir,
    }

    impl FakeDialog {
        fn new(body: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let script = dir.path().join("feedback-ui");
            fs::write(&script, format!("{}{}\n", PRELUDE, body)).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            Self {
                dir,
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }

        fn launcher(&self) -> DialogLauncher {
            DialogLauncher::new(self.dir.path().join("feedback-ui"), 12)
                .with_temp_dir(self.temp_dir.path())
        }

        fn seen_path(&self) -> PathBuf {
            PathBuf::from(fs::read_to_string(self.dir.path().join("seen_path")).unwrap())
        }

        fn temp_dir_is_empty(&self) -> bool {
            fs::read_dir(self.temp_dir.path()).unwrap().next().is_none()
        }
    }

    #[test]
    fn test_successful_round_trip_removes_temp_file() {
        let fake = FakeDialog::new(
            r#"printf '%s' '{"interactive_feedback":"Needs changes\n\nplease rename foo to bar"}' > "$out""#,
        );
        let cancel = AtomicBool::new(false);

        let result = fake.launcher().request_feedback(&cancel).unwrap();

        assert_eq!(
            result.interactive_feedback,
            "Needs changes\n\nplease rename foo to bar"
        );
        assert_eq!(result.git_commit, None);

        let seen = fake.seen_path();
        assert!(seen.starts_with(fake.temp_dir.path()));
        let name = seen.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("feedback-") && name.ends_with(".json"));
        assert!(!seen.exists());
        assert!(fake.temp_dir_is_empty());
    }

    #[test]
    fn test_non_zero_exit_is_launch_failure() {
        let fake = FakeDialog::new("exit 2");
        let cancel = AtomicBool::new(false);

        let err = fake.launcher().request_feedback(&cancel).unwrap_err();

        assert!(matches!(err, FeedbackError::Launch { code: Some(2) }));
        assert!(err.to_string().contains("exit code 2"));
        assert!(!fake.seen_path().exists());
    }

    #[test]
    fn test_clean_exit_without_result_is_read_failure() {
        let fake = FakeDialog::new("exit 0");
        let cancel = AtomicBool::new(false);

        let err = fake.launcher().request_feedback(&cancel).unwrap_err();

        assert!(err.is_result_failure());
        assert!(fake.temp_dir_is_empty());
    }

    #[test]
    fn test_removed_result_is_read_failure() {
        let fake = FakeDialog::new(r#"rm -f "$out""#);
        let cancel = AtomicBool::new(false);

        let err = fake.launcher().request_feedback(&cancel).unwrap_err();
        assert!(matches!(err, FeedbackError::ResultRead { .. }));
    }

    #[test]
    fn test_commit_request_appends_instruction() {
        let fake = FakeDialog::new(
            r#"printf '%s' '{"interactive_feedback":"Rename foo. Then bar.","git_commit":true}' > "$out""#,
        );
        let cancel = AtomicBool::new(false);

        let result = fake.launcher().request_feedback(&cancel).unwrap();

        assert_eq!(
            result.interactive_feedback,
            "Rename foo. Then bar.\n\n[AUTO COMMIT REQUESTED] Create commit: feat: Rename foo"
        );
        assert_eq!(result.git_commit, Some(true));
    }

    #[test]
    fn test_launch_returns_raw_record() {
        let fake = FakeDialog::new(
            r#"printf '%s' '{"interactive_feedback":"raw","git_commit":true}' > "$out""#,
        );
        let cancel = AtomicBool::new(false);

        let result = fake.launcher().launch(&cancel).unwrap();
        assert_eq!(result.interactive_feedback, "raw");
    }

    #[test]
    fn test_arguments_passed_to_dialog() {
        let fake = FakeDialog::new(
            r#"printf '%s' '{"interactive_feedback":""}' > "$out""#,
        );
        // Re-write the script to dump argv before the prelude consumes it
        let script = fake.dir.path().join("feedback-ui");
        let original = fs::read_to_string(&script).unwrap();
        let dumped = original.replacen(
            "here=\"$(dirname \"$0\")\"\n",
            "here=\"$(dirname \"$0\")\"\nfor a in \"$@\"; do printf '[%s]' \"$a\"; done > \"$here/argv\"\n",
            1,
        );
        fs::write(&script, dumped).unwrap();

        let cancel = AtomicBool::new(false);
        fake.launcher()
            .with_offer_commit(true)
            .request_feedback(&cancel)
            .unwrap();

        let argv = fs::read_to_string(fake.dir.path().join("argv")).unwrap();
        assert!(argv.starts_with("[--prompt][][--output-file]["));
        assert!(argv.ends_with("[--predefined-options][][--font-size][12][--offer-commit]"));
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let launcher = DialogLauncher::new(temp_dir.path().join("does-not-exist"), 12)
            .with_temp_dir(temp_dir.path());
        let cancel = AtomicBool::new(false);

        let err = launcher.request_feedback(&cancel).unwrap_err();

        assert!(matches!(err, FeedbackError::Spawn { .. }));
        assert!(err.is_launch_failure());
        assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_cancel_kills_dialog_and_removes_temp_file() {
        let fake = FakeDialog::new("sleep 30");
        let launcher = fake.launcher();
        let cancel = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancel);
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            flag.store(true, Ordering::SeqCst);
        });

        let start = Instant::now();
        let err = launcher.request_feedback(&cancel).unwrap_err();
        canceller.join().unwrap();

        assert!(matches!(err, FeedbackError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(fake.temp_dir_is_empty());
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let config = Config {
            font_size: Some(15),
            dialog_path: Some("/opt/bin/feedback-ui".to_string()),
            temp_dir: Some("/var/tmp".to_string()),
            offer_commit: Some(true),
        };

        let launcher = DialogLauncher::from_config(&config, None, None);
        assert_eq!(launcher.font_size(), 15);
        assert_eq!(launcher.program(), Path::new("/opt/bin/feedback-ui"));
        assert!(launcher.offer_commit);
        assert_eq!(launcher.temp_dir, PathBuf::from("/var/tmp"));

        let launcher =
            DialogLauncher::from_config(&config, Some(PathBuf::from("/custom/ui")), Some(20));
        assert_eq!(launcher.font_size(), 20);
        assert_eq!(launcher.program(), Path::new("/custom/ui"));

        let launcher = DialogLauncher::from_config(&config, None, Some(0));
        assert_eq!(launcher.font_size(), 15);
    }
}
