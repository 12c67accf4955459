//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

/// Bridge configuration as stored in `config.json`.
///
/// Every field is optional on disk; getters apply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Font size passed to every dialog (default: 12)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Explicit path to the dialog executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_path: Option<String>,
    /// Directory for the hand-off files (default: system temp dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
    /// Show the commit checkbox in the dialog (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_commit: Option<bool>,
}

impl Config {
    /// Returns the font size, or DEFAULT_FONT_SIZE if unset or zero
    pub fn get_font_size(&self) -> u32 {
        match self.font_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_FONT_SIZE,
        }
    }

    /// Returns the configured dialog executable with `~` expanded
    pub fn get_dialog_path(&self) -> Option<PathBuf> {
        self.dialog_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    /// Returns the directory hand-off files are created in
    pub fn get_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Returns whether the dialog should offer the commit checkbox
    pub fn get_offer_commit(&self) -> bool {
        self.offer_commit.unwrap_or(DEFAULT_OFFER_COMMIT)
    }
}
