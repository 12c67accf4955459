//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Location of the user config file (tilde expanded at load time)
pub const DEFAULT_CONFIG_PATH: &str = "~/.interactive-feedback/config.json";

/// Default font size for every piece of text in the dialog
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// Whether the dialog shows the "Commit these changes" checkbox by default
pub const DEFAULT_OFFER_COMMIT: bool = false;

/// Executable name of the dialog process, searched next to the bridge and on PATH
pub const DIALOG_BINARY_NAME: &str = "feedback-ui";
