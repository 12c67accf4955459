//! Dynamic Window Resizing Module
//!
//! Sizes the feedback dialog to its text as the user types.
//!
//! **Key Rules:**
//! - Text area shows `line_count + 1` rows, clamped to 3..=15
//! - Window width follows the widest line plus padding, clamped to 600..=1200
//! - Window height changes by exactly as much as the text area did, never below 300
//! - Changes smaller than a few pixels are ignored so manual resizes aren't fought
//!
//! Everything here is plain arithmetic; the dialog applies the result with
//! `window.resize`.

use tracing::debug;

/// Layout constants for size calculations
pub mod layout {
    /// Fewest rows the text area ever shows
    pub const MIN_LINES: usize = 3;
    /// Most rows before the text area scrolls instead of growing
    pub const MAX_LINES: usize = 15;
    /// Window width bounds
    pub const MIN_WINDOW_WIDTH: f32 = 600.0;
    pub const MAX_WINDOW_WIDTH: f32 = 1200.0;
    /// Window never gets shorter than this
    pub const MIN_WINDOW_HEIGHT: f32 = 300.0;
    /// Added to the widest line for margins and scrollbar
    pub const WIDTH_PADDING: f32 = 100.0;
    /// Vertical padding inside the text area (top + bottom)
    pub const TEXT_AREA_PADDING_Y: f32 = 16.0;
    /// Ignore size changes at or below this many pixels
    pub const RESIZE_THRESHOLD: f32 = 5.0;
    /// Row height relative to font size
    pub const LINE_HEIGHT_FACTOR: f32 = 1.5;
    /// Average glyph advance relative to font size
    pub const CHAR_WIDTH_FACTOR: f32 = 0.6;
}

use layout::*;

/// Approximate text metrics derived from the configured font size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub row_height: f32,
    pub char_width: f32,
}

impl TextMetrics {
    pub fn for_font_size(font_size: f32) -> Self {
        let font_size = font_size.max(1.0);
        Self {
            row_height: (font_size * LINE_HEIGHT_FACTOR).ceil(),
            char_width: font_size * CHAR_WIDTH_FACTOR,
        }
    }
}

/// Number of lines in `text`; an empty string is one line
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Rows the text area should show for `line_count` lines of text
pub fn visible_rows(line_count: usize) -> usize {
    (line_count + 1).clamp(MIN_LINES, MAX_LINES)
}

/// Height of a text area showing `rows` rows
pub fn text_area_height(rows: usize, metrics: &TextMetrics) -> f32 {
    rows as f32 * metrics.row_height + TEXT_AREA_PADDING_Y
}

/// Rendered width of the widest line
pub fn widest_line_width(text: &str, metrics: &TextMetrics) -> f32 {
    text.split('\n')
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as f32
        * metrics.char_width
}

/// Window width for `text`
pub fn target_window_width(text: &str, metrics: &TextMetrics) -> f32 {
    (widest_line_width(text, metrics) + WIDTH_PADDING).clamp(MIN_WINDOW_WIDTH, MAX_WINDOW_WIDTH)
}

/// True when `target` differs enough from `current` to be worth a resize
pub fn needs_resize(current: (f32, f32), target: (f32, f32)) -> bool {
    (current.0 - target.0).abs() > RESIZE_THRESHOLD || (current.1 - target.1).abs() > RESIZE_THRESHOLD
}

/// Result of re-laying out the dialog after a text change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogSize {
    pub text_area_height: f32,
    pub window_width: f32,
    pub window_height: f32,
}

/// Tracks the text area's current height so window height can follow it by deltas
#[derive(Debug, Clone)]
pub struct FeedbackLayout {
    metrics: TextMetrics,
    text_area_height: f32,
}

impl FeedbackLayout {
    pub fn new(font_size: f32) -> Self {
        let metrics = TextMetrics::for_font_size(font_size);
        Self {
            text_area_height: text_area_height(MIN_LINES, &metrics),
            metrics,
        }
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    pub fn text_area_height(&self) -> f32 {
        self.text_area_height
    }

    /// Recompute sizes for `text` given the window's current height.
    ///
    /// Updates the tracked text-area height; the caller decides whether to
    /// apply the window size via [`needs_resize`].
    pub fn on_text_changed(&mut self, text: &str, current_window_height: f32) -> DialogSize {
        let rows = visible_rows(line_count(text));
        let new_text_height = text_area_height(rows, &self.metrics);
        let delta = new_text_height - self.text_area_height;
        let window_height = (current_window_height + delta).max(MIN_WINDOW_HEIGHT);
        let window_width = target_window_width(text, &self.metrics);

        if delta != 0.0 {
            debug!(
                rows,
                text_area_height = new_text_height,
                window_height,
                window_width,
                "Feedback text area resized"
            );
        }

        self.text_area_height = new_text_height;
        DialogSize {
            text_area_height: new_text_height,
            window_width,
            window_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count_matches_newlines() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("one"), 1);
        assert_eq!(line_count("one\ntwo\n"), 3);
    }

    #[test]
    fn test_visible_rows_clamped() {
        assert_eq!(visible_rows(1), MIN_LINES);
        assert_eq!(visible_rows(2), 3);
        assert_eq!(visible_rows(5), 6);
        assert_eq!(visible_rows(14), 15);
        assert_eq!(visible_rows(400), MAX_LINES);
    }

    #[test]
    fn test_metrics_scale_with_font() {
        let small = TextMetrics::for_font_size(12.0);
        let large = TextMetrics::for_font_size(24.0);
        assert_eq!(small.row_height, 18.0);
        assert!(large.row_height > small.row_height);
        assert!(large.char_width > small.char_width);
    }

    #[test]
    fn test_width_is_clamped() {
        let metrics = TextMetrics::for_font_size(12.0);
        assert_eq!(target_window_width("", &metrics), MIN_WINDOW_WIDTH);
        assert_eq!(
            target_window_width(&"x".repeat(5000), &metrics),
            MAX_WINDOW_WIDTH
        );

        let width = target_window_width(&"y".repeat(100), &metrics);
        assert!((width - 820.0).abs() < 0.01);
    }

    #[test]
    fn test_width_follows_widest_line() {
        let metrics = TextMetrics::for_font_size(10.0);
        let text = format!("short\n{}\nshort", "z".repeat(120));
        let width = target_window_width(&text, &metrics);
        assert!((width - (120.0 * 6.0 + WIDTH_PADDING)).abs() < 0.01);
    }

    #[test]
    fn test_height_grows_by_text_delta() {
        let mut layout = FeedbackLayout::new(12.0);
        let start = layout.text_area_height();

        // 4 lines -> 5 rows, two more than the initial three
        let size = layout.on_text_changed("a\nb\nc\nd", 320.0);
        assert_eq!(size.text_area_height, start + 2.0 * 18.0);
        assert_eq!(size.window_height, 320.0 + 36.0);
        assert_eq!(layout.text_area_height(), size.text_area_height);
    }

    #[test]
    fn test_height_shrinks_back_but_not_below_minimum() {
        let mut layout = FeedbackLayout::new(12.0);
        let grown = layout.on_text_changed(&"line\n".repeat(10), 300.0);
        assert!(grown.window_height > MIN_WINDOW_HEIGHT);

        let shrunk = layout.on_text_changed("", grown.window_height);
        assert_eq!(shrunk.window_height, 300.0);

        // A user who made the window tiny still gets the floor
        let floored = layout.on_text_changed("", 120.0);
        assert_eq!(floored.window_height, MIN_WINDOW_HEIGHT);
        assert_eq!(floored.text_area_height, text_area_height(MIN_LINES, layout.metrics()));
    }

    #[test]
    fn test_text_area_never_exceeds_max_rows() {
        let mut layout = FeedbackLayout::new(12.0);
        let size = layout.on_text_changed(&"x\n".repeat(100), 300.0);
        assert_eq!(size.text_area_height, text_area_height(MAX_LINES, layout.metrics()));
    }

    #[test]
    fn test_needs_resize_threshold() {
        assert!(!needs_resize((600.0, 300.0), (600.0, 300.0)));
        assert!(!needs_resize((600.0, 300.0), (604.0, 303.0)));
        assert!(needs_resize((600.0, 300.0), (600.0, 318.0)));
        assert!(needs_resize((600.0, 300.0), (700.0, 300.0)));
    }
}
