//! Configuration module - Bridge settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.interactive-feedback/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definition
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_FONT_SIZE, DIALOG_BINARY_NAME};

pub use types::Config;

pub use loader::{load_config, load_config_from, parse_config};

#[cfg(test)]
pub use defaults::DEFAULT_OFFER_COMMIT;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
