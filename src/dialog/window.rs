//! Feedback Dialog Window
//!
//! One window, one form: the agent's prompt, a checkbox per predefined
//! option, an optional commit checkbox, a growing text area and a send
//! button. Submitting or closing writes exactly one result and quits.

use anyhow::Result;
use gpui::{
    div, prelude::*, px, rems, size, App, ClickEvent, Context, Entity, FocusHandle, Focusable,
    FontWeight, IntoElement, KeyDownEvent, ParentElement, Render, SharedString, Styled,
    Subscription, Window, WindowBounds, WindowKind, WindowOptions,
};

#[cfg(target_os = "macos")]
use cocoa::appkit::NSApp;
#[cfg(target_os = "macos")]
use cocoa::base::{id, nil};
use gpui_component::{
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    theme::{ActiveTheme, Theme, ThemeMode},
    Root,
};
#[cfg(target_os = "macos")]
use objc::{msg_send, sel, sel_impl};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    build_result, input_placeholder, is_submit_chord, prompt_text, stdout_report, OptionSelection,
};
use crate::feedback::{write_result_atomic, FeedbackRequest, FeedbackResult};
use crate::logging;
use crate::window_resize::layout::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};
use crate::window_resize::{needs_resize, FeedbackLayout};
use crate::window_state::{self, DisplayBounds};

/// Title of the dialog window; also used to find it for the floating level
pub const WINDOW_TITLE: &str = "Interactive Feedback MCP";

/// How the dialog ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The user pressed send or the submit chord
    Submitted,
    /// The window was closed without submitting; an empty result was written
    Closed,
    /// The result could not be written
    WriteFailed(String),
}

impl DialogOutcome {
    /// Process exit code for the dialog binary
    pub fn exit_code(&self) -> i32 {
        match self {
            DialogOutcome::Submitted | DialogOutcome::Closed => 0,
            DialogOutcome::WriteFailed(_) => 1,
        }
    }
}

/// Called once with the outcome, before the app quits
pub type FinishHandler = Box<dyn Fn(&DialogOutcome)>;

pub struct FeedbackDialog {
    request: FeedbackRequest,
    options: OptionSelection,
    commit_checked: bool,
    input_state: Entity<InputState>,
    layout: FeedbackLayout,
    focus_handle: FocusHandle,
    on_finish: FinishHandler,
    /// Set once the result has been written; later submits and closes are no-ops
    finished: bool,
    _subscriptions: Vec<Subscription>,
}

impl FeedbackDialog {
    pub fn new(
        request: FeedbackRequest,
        on_finish: FinishHandler,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let layout = FeedbackLayout::new(request.font_size as f32);

        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .multi_line(true)
                .rows(crate::window_resize::layout::MIN_LINES)
                .placeholder(input_placeholder())
        });

        let input_sub = cx.subscribe_in(&input_state, window, {
            move |this, _, ev: &InputEvent, window, cx| match ev {
                InputEvent::Change => this.on_text_changed(window, cx),
                InputEvent::PressEnter { secondary: true } => this.submit(window, cx),
                _ => {}
            }
        });

        let dialog = cx.weak_entity();
        window.on_window_should_close(cx, move |window, cx| {
            if let Some(dialog) = dialog.upgrade() {
                dialog.update(cx, |this, cx| this.finish(None, window, cx));
            }
            true
        });

        info!(
            options = request.predefined_options.len(),
            offer_commit = request.offer_commit,
            font_size = request.font_size,
            has_output_file = request.output_path.is_some(),
            "Feedback dialog created"
        );

        Self {
            options: OptionSelection::new(request.predefined_options.clone()),
            request,
            commit_checked: false,
            input_state,
            layout,
            focus_handle: cx.focus_handle(),
            on_finish,
            finished: false,
            _subscriptions: vec![input_sub],
        }
    }

    fn text(&self, cx: &App) -> String {
        self.input_state.read(cx).value().to_string()
    }

    fn on_text_changed(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let text = self.text(cx);
        let bounds = window.bounds();
        let current_width: f32 = bounds.size.width.into();
        let current_height: f32 = bounds.size.height.into();

        let target = self.layout.on_text_changed(&text, current_height);
        if needs_resize(
            (current_width, current_height),
            (target.window_width, target.window_height),
        ) {
            debug!(
                width = target.window_width,
                height = target.window_height,
                "Resizing feedback window"
            );
            window.resize(size(px(target.window_width), px(target.window_height)));
        }
        cx.notify();
    }

    fn toggle_option(&mut self, index: usize, cx: &mut Context<Self>) {
        self.options.toggle(index);
        logging::log_ui_event(
            "FeedbackDialog",
            "toggle_option",
            self.options.labels().get(index).map(String::as_str),
        );
        cx.notify();
    }

    fn toggle_commit(&mut self, cx: &mut Context<Self>) {
        self.commit_checked = !self.commit_checked;
        cx.notify();
    }

    fn submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        // The chord can reach both the input and the root key handler
        if self.finished {
            return;
        }
        let commit_requested = self.request.offer_commit && self.commit_checked;
        let result = build_result(&self.options, &self.text(cx), commit_requested);
        self.finish(Some(result), window, cx);
        window.remove_window();
    }

    /// Write the result (or an empty one), remember the window bounds and quit.
    fn finish(
        &mut self,
        result: Option<FeedbackResult>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.finished {
            return;
        }
        self.finished = true;

        window_state::save_window_from_gpui(window.window_bounds());

        let submitted = result.is_some();
        let result = result.unwrap_or_else(FeedbackResult::empty);
        let outcome = match &self.request.output_path {
            Some(path) => match write_result_atomic(path, &result) {
                Ok(()) => None,
                Err(e) => {
                    logging::log_error(
                        "DIALOG",
                        &e.to_string(),
                        Some("writing feedback result"),
                    );
                    Some(DialogOutcome::WriteFailed(e.to_string()))
                }
            },
            None => {
                println!("{}", stdout_report(&result));
                None
            }
        }
        .unwrap_or(if submitted {
            DialogOutcome::Submitted
        } else {
            DialogOutcome::Closed
        });

        info!(
            outcome = ?outcome,
            chars = result.interactive_feedback.chars().count(),
            git_commit = result.wants_commit(),
            "Feedback dialog finished"
        );
        (self.on_finish)(&outcome);
        cx.quit();
    }

    fn render_checkbox(
        &self,
        id: impl Into<gpui::ElementId>,
        label: SharedString,
        checked: bool,
        cx: &mut Context<Self>,
    ) -> gpui::Stateful<gpui::Div> {
        let theme = cx.theme();
        let mut checkbox_box = div()
            .flex()
            .items_center()
            .justify_center()
            .w(rems(1.125))
            .h(rems(1.125))
            .bg(if checked { theme.primary } else { theme.background })
            .border_1()
            .border_color(theme.border)
            .rounded(px(4.));

        if checked {
            checkbox_box = checkbox_box.child(
                div()
                    .text_sm()
                    .text_color(theme.primary_foreground)
                    .font_weight(FontWeight::BOLD)
                    .child("✓"),
            );
        }

        div()
            .id(id)
            .flex()
            .flex_row()
            .items_center()
            .gap(rems(0.5))
            .cursor_pointer()
            .child(checkbox_box)
            .child(div().text_color(theme.foreground).child(label))
    }
}

impl Focusable for FeedbackDialog {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for FeedbackDialog {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let font_size = px(self.request.font_size as f32);

        let mut root = div()
            .id("feedback-dialog-root")
            .key_context("FeedbackDialog")
            .track_focus(&self.focus_handle)
            .flex()
            .flex_col()
            .size_full()
            .p(rems(0.75))
            .gap(rems(0.5))
            .bg(cx.theme().background)
            .text_color(cx.theme().foreground)
            .text_size(font_size)
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                let key = event.keystroke.key.to_lowercase();
                if is_submit_chord(&key, &event.keystroke.modifiers) {
                    this.submit(window, cx);
                    cx.stop_propagation();
                }
            }));

        if let Some(prompt) = prompt_text(&self.request.prompt) {
            root = root.child(div().w_full().child(prompt));
        }

        if !self.options.is_empty() {
            let mut rows = div().flex().flex_col().gap(rems(0.25));
            for (index, label) in self.options.labels().iter().enumerate() {
                let row = self
                    .render_checkbox(
                        ("feedback-option", index),
                        label.clone().into(),
                        self.options.is_checked(index),
                        cx,
                    )
                    .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                        this.toggle_option(index, cx);
                    }));
                rows = rows.child(row);
            }
            root = root
                .child(rows)
                .child(div().w_full().h(px(1.)).bg(cx.theme().border));
        }

        if self.request.offer_commit {
            let commit_row = self
                .render_checkbox(
                    "feedback-commit",
                    "Commit these changes".into(),
                    self.commit_checked,
                    cx,
                )
                .on_click(cx.listener(|this, _: &ClickEvent, _window, cx| {
                    this.toggle_commit(cx);
                }));
            root = root.child(commit_row);
        }

        root.child(
            div()
                .w_full()
                .h(px(self.layout.text_area_height()))
                .child(Input::new(&self.input_state).h_full()),
        )
        .child(
            div().flex().flex_row().justify_end().child(
                Button::new("send-feedback")
                    .primary()
                    .label("Send Feedback")
                    .on_click(cx.listener(|this, _: &ClickEvent, window, cx| {
                        this.submit(window, cx);
                    })),
            ),
        )
    }
}

/// Apply the dark theme at the requested font size
fn apply_theme(font_size: u32, cx: &mut App) {
    let theme = Theme::global_mut(cx);
    theme.mode = ThemeMode::Dark;
    theme.font_size = px(font_size as f32);
}

/// Window kind that keeps the dialog above other windows.
///
/// macOS gets a normal window raised to the floating level after it opens;
/// elsewhere the pop-up kind stays on top by itself.
pub fn dialog_window_kind() -> WindowKind {
    if cfg!(target_os = "macos") {
        WindowKind::Normal
    } else {
        WindowKind::PopUp
    }
}

/// Options for the dialog window at `window_bounds`
pub fn dialog_window_options(window_bounds: WindowBounds) -> WindowOptions {
    WindowOptions {
        window_bounds: Some(window_bounds),
        titlebar: Some(gpui::TitlebarOptions {
            title: Some(WINDOW_TITLE.into()),
            ..Default::default()
        }),
        window_min_size: Some(size(px(MIN_WINDOW_WIDTH), px(MIN_WINDOW_HEIGHT))),
        focus: true,
        show: true,
        kind: dialog_window_kind(),
        ..Default::default()
    }
}

/// Open the dialog for `request`; `on_finish` receives the outcome when it closes.
pub fn open_feedback_window(
    request: FeedbackRequest,
    on_finish: FinishHandler,
    cx: &mut App,
) -> Result<()> {
    apply_theme(request.font_size, cx);

    let displays: Vec<DisplayBounds> = cx
        .displays()
        .iter()
        .map(|display| DisplayBounds::from_gpui(display.bounds()))
        .collect();
    let window_options = dialog_window_options(window_state::get_initial_bounds(&displays));

    let dialog_holder: Arc<Mutex<Option<Entity<FeedbackDialog>>>> = Arc::new(Mutex::new(None));
    let holder_for_closure = dialog_holder.clone();

    let handle = cx.open_window(window_options, move |window, cx| {
        let view = cx.new(|cx| FeedbackDialog::new(request, on_finish, window, cx));
        *holder_for_closure.lock() = Some(view.clone());
        cx.new(|cx| Root::new(view, window, cx))
    })?;

    cx.activate(true);

    if let Some(dialog) = dialog_holder.lock().take() {
        handle.update(cx, |_root, window, cx| {
            window.activate_window();
            dialog.update(cx, |dialog, cx| {
                dialog
                    .input_state
                    .update(cx, |state, cx| state.focus(window, cx));
            });
        })?;
    }

    #[cfg(target_os = "macos")]
    configure_as_floating_panel();
    Ok(())
}

/// Keep the dialog above other windows.
#[cfg(target_os = "macos")]
fn configure_as_floating_panel() {
    use std::ffi::CStr;

    unsafe {
        let app: id = NSApp();
        let windows: id = msg_send![app, windows];
        let count: usize = msg_send![windows, count];

        for i in 0..count {
            let window: id = msg_send![windows, objectAtIndex: i];
            let title: id = msg_send![window, title];
            if title == nil {
                continue;
            }
            let title_cstr: *const i8 = msg_send![title, UTF8String];
            if title_cstr.is_null() {
                continue;
            }
            if CStr::from_ptr(title_cstr).to_string_lossy() == WINDOW_TITLE {
                // NSFloatingWindowLevel
                let floating_level: i64 = 3;
                let _: () = msg_send![window, setLevel: floating_level];
                let _: () = msg_send![window, setRestorable: false];
                debug!("Feedback window configured as floating panel");
                return;
            }
        }

        tracing::warn!("Feedback window not found by title for floating panel config");
    }
}
