//! Window State Persistence
//!
//! Saves and restores the feedback dialog's geometry. The state lives in
//! `<config dir>/InteractiveFeedbackMCP/window-state.json` under the
//! `MainWindow_General` group.
//!
//! 1. **Canonical coordinate space**: global top-left origin, y increases downward
//! 2. **Persistence via WindowBounds**: aligns with GPUI's `WindowBounds` (Windowed/Maximized/Fullscreen)
//! 3. **Restore via WindowOptions.window_bounds**: no "jump after open"
//! 4. **Validation via geometry intersection**: not display IDs (which can change)
//! 5. **Save on close**: the dialog only ever closes, it is never hidden

use gpui::{point, px, Bounds, Pixels, WindowBounds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging;
use crate::window_resize::layout::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};

/// Application identifier used for the settings directory
pub const APP_IDENTIFIER: &str = "InteractiveFeedbackMCP";

/// Group key the dialog's geometry is stored under
pub const WINDOW_GROUP_KEY: &str = "MainWindow_General";

/// Size used when nothing usable has been saved
pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 300.0;

// ============================================================================
// Types
// ============================================================================

/// A display's bounds in global top-left coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayBounds {
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    pub fn from_gpui(bounds: Bounds<Pixels>) -> Self {
        Self {
            origin_x: f64::from(bounds.origin.x),
            origin_y: f64::from(bounds.origin.y),
            width: f64::from(bounds.size.width),
            height: f64::from(bounds.size.height),
        }
    }
}

/// Window mode (matches GPUI WindowBounds variants)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistedWindowMode {
    #[default]
    Windowed,
    Maximized,
    Fullscreen,
}

/// Persisted bounds for the dialog window.
/// Uses canonical "top-left origin" coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PersistedWindowBounds {
    #[serde(default)]
    pub mode: PersistedWindowMode,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for PersistedWindowBounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl PersistedWindowBounds {
    /// Convert to GPUI WindowBounds
    #[allow(clippy::wrong_self_convention)]
    pub fn to_gpui(&self) -> WindowBounds {
        let bounds = Bounds {
            origin: point(px(self.x as f32), px(self.y as f32)),
            size: gpui::size(px(self.width as f32), px(self.height as f32)),
        };
        match self.mode {
            PersistedWindowMode::Windowed => WindowBounds::Windowed(bounds),
            PersistedWindowMode::Maximized => WindowBounds::Maximized(bounds),
            PersistedWindowMode::Fullscreen => WindowBounds::Fullscreen(bounds),
        }
    }

    /// Create from GPUI WindowBounds
    pub fn from_gpui(wb: WindowBounds) -> Self {
        let (mode, b): (PersistedWindowMode, Bounds<Pixels>) = match wb {
            WindowBounds::Windowed(b) => (PersistedWindowMode::Windowed, b),
            WindowBounds::Maximized(b) => (PersistedWindowMode::Maximized, b),
            WindowBounds::Fullscreen(b) => (PersistedWindowMode::Fullscreen, b),
        };
        Self {
            mode,
            x: f64::from(b.origin.x),
            y: f64::from(b.origin.y),
            width: f64::from(b.size.width),
            height: f64::from(b.size.height),
        }
    }

    /// Create from raw coordinates (already in top-left canonical space)
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            mode: PersistedWindowMode::Windowed,
            x,
            y,
            width,
            height,
        }
    }

    /// Grow to the dialog's minimum size, keeping the origin
    pub fn with_minimum_size(mut self) -> Self {
        self.width = self.width.max(f64::from(MIN_WINDOW_WIDTH));
        self.height = self.height.max(f64::from(MIN_WINDOW_HEIGHT));
        self
    }

    /// A saved size of zero or less can't be restored
    fn has_usable_size(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// The full persisted state file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WindowStateFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(
        rename = "MainWindow_General",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub main_window: Option<PersistedWindowBounds>,
}

fn default_version() -> u32 {
    1
}

// ============================================================================
// File Path
// ============================================================================

/// Get the path to the window state file:
/// `<config dir>/InteractiveFeedbackMCP/window-state.json`
pub fn get_state_file_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_IDENTIFIER)
        .join("window-state.json")
}

// ============================================================================
// Load / Save
// ============================================================================

/// Load the window state file at `path`
pub fn load_state_file(path: &Path) -> Option<WindowStateFile> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                logging::log(
                    "WINDOW_STATE",
                    &format!("Failed to parse window-state.json: {}", e),
                );
                None
            }
        },
        Err(e) => {
            logging::log(
                "WINDOW_STATE",
                &format!("Failed to read window-state.json: {}", e),
            );
            None
        }
    }
}

/// Save the window state file at `path` (atomic write)
pub fn save_state_file(path: &Path, state: &WindowStateFile) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            logging::log(
                "WINDOW_STATE",
                &format!("Failed to create directory: {}", e),
            );
            return false;
        }
    }
    let json = match serde_json::to_string_pretty(state) {
        Ok(j) => j,
        Err(e) => {
            logging::log("WINDOW_STATE", &format!("Failed to serialize: {}", e));
            return false;
        }
    };
    // Atomic write: temp file then rename
    let tmp_path = path.with_extension("json.tmp");
    if let Err(e) = fs::write(&tmp_path, &json) {
        logging::log("WINDOW_STATE", &format!("Failed to write temp file: {}", e));
        return false;
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        logging::log(
            "WINDOW_STATE",
            &format!("Failed to rename temp file: {}", e),
        );
        let _ = fs::remove_file(&tmp_path);
        return false;
    }
    true
}

/// Load the dialog's saved bounds
pub fn load_window_bounds(path: &Path) -> Option<PersistedWindowBounds> {
    load_state_file(path)?.main_window
}

/// Save the dialog's bounds, keeping anything else in the file
pub fn save_window_bounds(path: &Path, bounds: PersistedWindowBounds) -> bool {
    let mut state = load_state_file(path).unwrap_or_default();
    state.version = 1;
    state.main_window = Some(bounds);
    let saved = save_state_file(path, &state);
    if saved {
        logging::log(
            "WINDOW_STATE",
            &format!(
                "Saved dialog bounds: ({:.0}, {:.0}) {}x{}",
                bounds.x, bounds.y, bounds.width, bounds.height
            ),
        );
    }
    saved
}

// ============================================================================
// Visibility Validation
// ============================================================================

const MIN_VISIBLE_AREA: f64 = 64.0 * 64.0;
const MIN_EDGE_MARGIN: f64 = 50.0;

/// Check if saved bounds are still visible on current displays.
pub fn is_bounds_visible(bounds: &PersistedWindowBounds, displays: &[DisplayBounds]) -> bool {
    displays.iter().any(|display| {
        rect_intersection(bounds, display).is_some_and(|(w, h)| w * h >= MIN_VISIBLE_AREA)
    })
}

/// Width and height of the overlap between a window and a display
fn rect_intersection(bounds: &PersistedWindowBounds, display: &DisplayBounds) -> Option<(f64, f64)> {
    let left = bounds.x.max(display.origin_x);
    let top = bounds.y.max(display.origin_y);
    let right = (bounds.x + bounds.width).min(display.origin_x + display.width);
    let bottom = (bounds.y + bounds.height).min(display.origin_y + display.height);
    if left < right && top < bottom {
        Some((right - left, bottom - top))
    } else {
        None
    }
}

/// Clamp bounds to ensure window is visible and grabbable on given displays.
pub fn clamp_bounds_to_displays(
    bounds: &PersistedWindowBounds,
    displays: &[DisplayBounds],
) -> Option<PersistedWindowBounds> {
    let target = find_best_display_for_bounds(bounds, displays)?;
    let mut clamped = *bounds;
    clamped.width = clamped
        .width
        .min(target.width - MIN_EDGE_MARGIN * 2.0)
        .max(f64::from(MIN_WINDOW_WIDTH));
    clamped.height = clamped
        .height
        .min(target.height - MIN_EDGE_MARGIN * 2.0)
        .max(f64::from(MIN_WINDOW_HEIGHT));
    let min_x = target.origin_x + MIN_EDGE_MARGIN;
    let max_x = (target.origin_x + target.width - clamped.width - MIN_EDGE_MARGIN).max(min_x);
    clamped.x = clamped.x.clamp(min_x, max_x);
    let min_y = target.origin_y + MIN_EDGE_MARGIN;
    let max_y = (target.origin_y + target.height - clamped.height - MIN_EDGE_MARGIN).max(min_y);
    clamped.y = clamped.y.clamp(min_y, max_y);
    Some(clamped)
}

/// Display containing the window's centre, else the one it overlaps most,
/// else the first display.
fn find_best_display_for_bounds<'a>(
    bounds: &PersistedWindowBounds,
    displays: &'a [DisplayBounds],
) -> Option<&'a DisplayBounds> {
    let cx = bounds.x + bounds.width / 2.0;
    let cy = bounds.y + bounds.height / 2.0;
    let containing = displays.iter().find(|d| {
        cx >= d.origin_x && cx < d.origin_x + d.width && cy >= d.origin_y && cy < d.origin_y + d.height
    });
    if containing.is_some() {
        return containing;
    }

    let mut best: Option<&DisplayBounds> = None;
    let mut best_area = 0.0;
    for d in displays {
        if let Some((w, h)) = rect_intersection(bounds, d) {
            if w * h > best_area {
                best_area = w * h;
                best = Some(d);
            }
        }
    }
    best.or_else(|| displays.first())
}

/// Default 600x300 window centred on the primary (first) display
pub fn default_bounds(displays: &[DisplayBounds]) -> PersistedWindowBounds {
    match displays.first() {
        Some(d) => PersistedWindowBounds::new(
            d.origin_x + (d.width - DEFAULT_WIDTH) / 2.0,
            d.origin_y + (d.height - DEFAULT_HEIGHT) / 2.0,
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
        ),
        None => PersistedWindowBounds::default(),
    }
}

/// Choose where the dialog opens: saved bounds if visible, clamped saved
/// bounds if not, otherwise the centred default. Saved sizes below the
/// dialog's minimum are grown to it.
pub fn resolve_initial_bounds(
    saved: Option<PersistedWindowBounds>,
    displays: &[DisplayBounds],
) -> PersistedWindowBounds {
    if let Some(saved) = saved
        .filter(PersistedWindowBounds::has_usable_size)
        .map(PersistedWindowBounds::with_minimum_size)
    {
        if is_bounds_visible(&saved, displays) {
            logging::log(
                "WINDOW_STATE",
                &format!("Restoring dialog to ({:.0}, {:.0})", saved.x, saved.y),
            );
            return saved;
        }
        if let Some(clamped) = clamp_bounds_to_displays(&saved, displays) {
            logging::log(
                "WINDOW_STATE",
                &format!("Clamped dialog to ({:.0}, {:.0})", clamped.x, clamped.y),
            );
            return clamped;
        }
        logging::log("WINDOW_STATE", "Saved dialog position no longer visible");
    }
    default_bounds(displays)
}

// ============================================================================
// High-Level API
// ============================================================================

/// Initial GPUI bounds for the dialog, read from the settings store
pub fn get_initial_bounds(displays: &[DisplayBounds]) -> WindowBounds {
    let saved = load_window_bounds(&get_state_file_path());
    resolve_initial_bounds(saved, displays).to_gpui()
}

/// Save window bounds from current GPUI window state to the settings store
pub fn save_window_from_gpui(window_bounds: WindowBounds) -> bool {
    save_window_bounds(
        &get_state_file_path(),
        PersistedWindowBounds::from_gpui(window_bounds),
    )
}

#[cfg(test)]
#[path = "window_state_tests.rs"]
mod tests;
