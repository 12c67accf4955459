use super::*;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.get_font_size(), DEFAULT_FONT_SIZE);
    assert_eq!(config.get_dialog_path(), None);
    assert_eq!(config.get_temp_dir(), std::env::temp_dir());
    assert_eq!(config.get_offer_commit(), DEFAULT_OFFER_COMMIT);
}

#[test]
fn test_config_camel_case_fields() {
    let config = parse_config(
        r#"{"fontSize": 16, "dialogPath": "/opt/feedback-ui", "tempDir": "/var/tmp", "offerCommit": true}"#,
    )
    .unwrap();

    assert_eq!(config.get_font_size(), 16);
    assert_eq!(
        config.get_dialog_path(),
        Some(PathBuf::from("/opt/feedback-ui"))
    );
    assert_eq!(config.get_temp_dir(), PathBuf::from("/var/tmp"));
    assert!(config.get_offer_commit());
}

#[test]
fn test_zero_font_size_falls_back_to_default() {
    let config = parse_config(r#"{"fontSize": 0}"#).unwrap();
    assert_eq!(config.get_font_size(), DEFAULT_FONT_SIZE);
}

#[test]
fn test_blank_paths_are_ignored() {
    let config = parse_config(r#"{"dialogPath": "  ", "tempDir": ""}"#).unwrap();
    assert_eq!(config.get_dialog_path(), None);
    assert_eq!(config.get_temp_dir(), std::env::temp_dir());
}

#[test]
fn test_dialog_path_tilde_is_expanded() {
    let config = parse_config(r#"{"dialogPath": "~/bin/feedback-ui"}"#).unwrap();
    let path = config.get_dialog_path().unwrap();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with("bin/feedback-ui"));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = parse_config(r#"{"fontSize": 13, "theme": "dark"}"#).unwrap();
    assert_eq!(config.get_font_size(), 13);
}

#[test]
fn test_empty_input_parses_as_defaults() {
    assert_eq!(parse_config("").unwrap(), Config::default());
    assert_eq!(parse_config("  \n").unwrap(), Config::default());
}

#[test]
fn test_invalid_json_is_config_error() {
    let err = parse_config(r#"{"fontSize": "big"}"#).unwrap_err();
    assert!(matches!(err, crate::error::FeedbackError::Config(_)));
}

#[test]
fn test_serialization_skips_unset_fields() {
    let config = Config {
        font_size: Some(14),
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"fontSize":14}"#);
}

#[test]
fn test_load_config_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("nope.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"fontSize": 18, "offerCommit": true}}"#).unwrap();

    let config = load_config_from(file.path());
    assert_eq!(config.get_font_size(), 18);
    assert!(config.get_offer_commit());
}

#[test]
fn test_load_config_from_malformed_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let config = load_config_from(file.path());
    assert_eq!(config, Config::default());
}

#[test]
fn test_default_config_path_is_tilde_relative() {
    assert!(DEFAULT_CONFIG_PATH.starts_with("~/"));
    assert_eq!(DIALOG_BINARY_NAME, "feedback-ui");
}
