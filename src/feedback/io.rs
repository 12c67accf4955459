//! The result file hand-off.
//!
//! The dialog writes exactly one record; the bridge reads it exactly once
//! after the dialog has exited. Writes go through a sibling temp file and a
//! rename, so a reader never sees a half-written record.

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use super::types::FeedbackResult;
use crate::error::{FeedbackError, Result, ResultExt};

/// Write `result` to `path`, creating parent directories as needed
#[instrument(skip(result), fields(path = %path.display()))]
pub fn write_result_atomic(path: &Path, result: &FeedbackResult) -> Result<()> {
    let write_err = |source: std::io::Error| FeedbackError::ResultWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_string(result)
        .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, json.as_bytes()).map_err(write_err)?;
    if let Err(e) = fs::rename(tmp_path, path) {
        fs::remove_file(tmp_path).warn_on_err();
        return Err(write_err(e));
    }

    debug!(bytes = json.len(), "Feedback result written");
    Ok(())
}

/// Read and parse the record at `path`. Missing, empty or malformed content
/// is an error; it is never downgraded to empty feedback.
#[instrument(fields(path = %path.display()))]
pub fn read_result(path: &Path) -> Result<FeedbackResult> {
    let contents = fs::read_to_string(path).map_err(|source| FeedbackError::ResultRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| FeedbackError::ResultParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = FeedbackResult::new("first\n\nsecond").with_commit_requested(true);

        write_result_atomic(&path, &result).unwrap();
        assert_eq!(read_result(&path).unwrap(), result);
    }

    #[test]
    fn test_write_creates_parent_dirs_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.json");

        write_result_atomic(&path, &FeedbackResult::empty()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested/deeper/out.json.tmp").exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"interactive_feedback":""}"#
        );
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "stale").unwrap();

        write_result_atomic(&path, &FeedbackResult::new("fresh")).unwrap();
        assert_eq!(read_result(&path).unwrap().interactive_feedback, "fresh");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_result(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FeedbackError::ResultRead { .. }));
    }

    #[test]
    fn test_read_empty_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "").unwrap();

        let err = read_result(&path).unwrap_err();
        assert!(matches!(err, FeedbackError::ResultParse { .. }));
        assert!(err.is_result_failure());
    }

    #[test]
    fn test_read_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        fs::write(&path, r#"{"interactive_feedback":"hi","mood":"good"}"#).unwrap();

        let result = read_result(&path).unwrap();
        assert_eq!(result.interactive_feedback, "hi");
        assert!(!result.wants_commit());
    }
}
