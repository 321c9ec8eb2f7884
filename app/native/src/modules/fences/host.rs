//! Host collaborators.
//!
//! The fence engine never talks to a windowing toolkit directly. It drives
//! windows through [`FenceSurface`], asks the user through [`UserPrompt`],
//! and opens things through [`ShellActions`]. The headless implementations
//! here keep every call in memory; the CLI and the tests run on them.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::state::{ItemsType, Monitor, Rect};
use super::window::menu::FenceMenu;
use super::window::style::{ChromeStyle, ItemVisual};
use crate::config::LaunchEffect;

// ============================================================================
// Traits
// ============================================================================

/// The live presentation of one fence. Only used from the UI thread.
pub trait FenceSurface {
    /// Current window rectangle in DIP.
    fn bounds(&self) -> Rect;
    fn set_bounds(&mut self, bounds: Rect);
    fn set_height(&mut self, height: f64);
    fn set_title(&mut self, title: &str);
    fn begin_title_edit(&mut self);
    fn end_title_edit(&mut self);
    fn set_visible(&mut self, visible: bool);
    fn set_content_visible(&mut self, visible: bool);
    fn set_resizable(&mut self, resizable: bool);
    fn set_lock_indicator(&mut self, locked: bool, tooltip: &str);
    fn apply_chrome(&mut self, style: &ChromeStyle);
    fn set_menu(&mut self, menu: &FenceMenu);
    fn show_items(&mut self, items: &[ItemVisual]);
    fn set_item_broken(&mut self, index: usize, broken: bool);
    fn fade_out_item(&mut self, index: usize);
    fn play_launch_effect(&mut self, index: usize, effect: LaunchEffect);
    fn set_note_text(&mut self, text: &str);
    fn set_tabs(&mut self, names: &[String], current: Option<usize>);
    fn close(&mut self);
}

/// Creates fence windows and reports the display layout.
pub trait WindowHost {
    fn create_surface(&mut self, id: &str, kind: ItemsType) -> Box<dyn FenceSurface>;
    fn monitors(&self) -> Vec<Monitor>;
}

/// Confirmation, notification, and wait-indicator surfaces.
pub trait UserPrompt: Send + Sync {
    /// Asks a yes/no question. Blocks until answered.
    fn confirm(&self, title: &str, message: &str) -> bool;
    /// Shows a non-blocking notification.
    fn notify(&self, title: &str, message: &str);
    fn show_wait(&self, message: &str);
    fn hide_wait(&self);
    /// Asks for a folder. `None` when the user cancels.
    fn pick_folder(&self) -> Option<PathBuf>;
}

/// Launching and revealing targets.
pub trait ShellActions: Send + Sync {
    fn launch(&self, target: &str, arguments: Option<&str>, elevated: bool) -> io::Result<()>;
    fn reveal(&self, path: &str) -> io::Result<()>;
    fn copy_to_clipboard(&self, text: &str) -> io::Result<()>;
}

/// Shows the wait indicator until dropped, on every exit path.
pub struct WaitIndicator {
    prompt: Arc<dyn UserPrompt>,
}

impl WaitIndicator {
    #[must_use]
    pub fn show(prompt: Arc<dyn UserPrompt>, message: &str) -> Self {
        prompt.show_wait(message);
        Self { prompt }
    }
}

impl Drop for WaitIndicator {
    fn drop(&mut self) { self.prompt.hide_wait(); }
}

// ============================================================================
// Headless Host
// ============================================================================

/// Everything a headless surface has been told to display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceState {
    pub kind: ItemsType,
    pub bounds: Rect,
    pub title: String,
    pub editing_title: bool,
    pub visible: bool,
    pub content_visible: bool,
    pub resizable: bool,
    pub locked: bool,
    pub lock_tooltip: String,
    pub chrome: Option<ChromeStyle>,
    pub menu: Option<FenceMenu>,
    pub items: Vec<ItemVisual>,
    pub faded_items: Vec<usize>,
    pub launch_effects: Vec<(usize, LaunchEffect)>,
    pub note: String,
    pub tabs: Vec<String>,
    pub current_tab: Option<usize>,
    /// Every rectangle applied through `set_bounds`, in order.
    pub bounds_history: Vec<Rect>,
    /// Every height applied through `set_height`, in order.
    pub height_history: Vec<f64>,
    pub closed: bool,
}

type SharedSurface = Arc<Mutex<SurfaceState>>;

pub struct HeadlessSurface {
    state: SharedSurface,
}

impl FenceSurface for HeadlessSurface {
    fn bounds(&self) -> Rect { self.state.lock().bounds }

    fn set_bounds(&mut self, bounds: Rect) {
        let mut state = self.state.lock();
        state.bounds = bounds;
        state.bounds_history.push(bounds);
    }

    fn set_height(&mut self, height: f64) {
        let mut state = self.state.lock();
        state.bounds.height = height;
        state.height_history.push(height);
    }

    fn set_title(&mut self, title: &str) { self.state.lock().title = title.to_string(); }

    fn begin_title_edit(&mut self) { self.state.lock().editing_title = true; }

    fn end_title_edit(&mut self) { self.state.lock().editing_title = false; }

    fn set_visible(&mut self, visible: bool) { self.state.lock().visible = visible; }

    fn set_content_visible(&mut self, visible: bool) { self.state.lock().content_visible = visible; }

    fn set_resizable(&mut self, resizable: bool) { self.state.lock().resizable = resizable; }

    fn set_lock_indicator(&mut self, locked: bool, tooltip: &str) {
        let mut state = self.state.lock();
        state.locked = locked;
        state.lock_tooltip = tooltip.to_string();
    }

    fn apply_chrome(&mut self, style: &ChromeStyle) { self.state.lock().chrome = Some(style.clone()); }

    fn set_menu(&mut self, menu: &FenceMenu) { self.state.lock().menu = Some(menu.clone()); }

    fn show_items(&mut self, items: &[ItemVisual]) {
        let mut state = self.state.lock();
        state.items = items.to_vec();
        state.faded_items.clear();
    }

    fn set_item_broken(&mut self, index: usize, broken: bool) {
        if let Some(item) = self.state.lock().items.get_mut(index) {
            item.broken = broken;
        }
    }

    fn fade_out_item(&mut self, index: usize) { self.state.lock().faded_items.push(index); }

    fn play_launch_effect(&mut self, index: usize, effect: LaunchEffect) {
        self.state.lock().launch_effects.push((index, effect));
    }

    fn set_note_text(&mut self, text: &str) { self.state.lock().note = text.to_string(); }

    fn set_tabs(&mut self, names: &[String], current: Option<usize>) {
        let mut state = self.state.lock();
        state.tabs = names.to_vec();
        state.current_tab = current;
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.visible = false;
    }
}

/// An in-memory window host.
///
/// Cloning shares the underlying surfaces, so a caller can keep a handle to
/// inspect what the engine displayed.
#[derive(Clone)]
pub struct HeadlessHost {
    surfaces: Arc<Mutex<HashMap<String, SharedSurface>>>,
    monitors: Arc<Mutex<Vec<Monitor>>>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        let mut primary = Monitor::new(0, Rect::new(0.0, 0.0, 1920.0, 1080.0), 1.0);
        primary.name = "Headless".to_string();
        Self::with_monitors(vec![primary])
    }
}

impl HeadlessHost {
    /// A host with a single 1920x1080 monitor at 100% scale.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_monitors(monitors: Vec<Monitor>) -> Self {
        Self {
            surfaces: Arc::new(Mutex::new(HashMap::new())),
            monitors: Arc::new(Mutex::new(monitors)),
        }
    }

    /// Replaces the display layout.
    pub fn set_monitors(&self, monitors: Vec<Monitor>) { *self.monitors.lock() = monitors; }

    /// Snapshot of the most recent surface created for `id`.
    #[must_use]
    pub fn surface(&self, id: &str) -> Option<SurfaceState> {
        self.surfaces.lock().get(id).map(|state| state.lock().clone())
    }

    /// Simulates the user resizing or moving a window outside the engine.
    pub fn set_surface_bounds(&self, id: &str, bounds: Rect) {
        if let Some(state) = self.surfaces.lock().get(id) {
            state.lock().bounds = bounds;
        }
    }

    /// Ids of every surface that is not closed.
    #[must_use]
    pub fn open_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .surfaces
            .lock()
            .iter()
            .filter(|(_, state)| !state.lock().closed)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl WindowHost for HeadlessHost {
    fn create_surface(&mut self, id: &str, kind: ItemsType) -> Box<dyn FenceSurface> {
        let state = Arc::new(Mutex::new(SurfaceState { kind, ..SurfaceState::default() }));
        self.surfaces.lock().insert(id.to_string(), Arc::clone(&state));
        Box::new(HeadlessSurface { state })
    }

    fn monitors(&self) -> Vec<Monitor> { self.monitors.lock().clone() }
}

// ============================================================================
// Headless Prompt & Shell
// ============================================================================

/// A prompt call recorded by [`HeadlessPrompt`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptCall {
    Confirm { title: String, message: String },
    Notify { title: String, message: String },
    ShowWait(String),
    HideWait,
}

/// Answers confirmations with a fixed reply and logs every call.
pub struct HeadlessPrompt {
    answer: Mutex<bool>,
    folder: Mutex<Option<PathBuf>>,
    calls: Mutex<Vec<PromptCall>>,
}

impl HeadlessPrompt {
    #[must_use]
    pub fn new(answer: bool) -> Self {
        Self { answer: Mutex::new(answer), folder: Mutex::new(None), calls: Mutex::new(Vec::new()) }
    }

    pub fn set_answer(&self, answer: bool) { *self.answer.lock() = answer; }

    /// Sets the folder returned by the next `pick_folder` calls.
    pub fn set_folder(&self, folder: Option<PathBuf>) { *self.folder.lock() = folder; }

    #[must_use]
    pub fn calls(&self) -> Vec<PromptCall> { self.calls.lock().clone() }

    /// Whether the wait indicator is currently shown.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        let calls = self.calls.lock();
        let shown = calls.iter().filter(|c| matches!(c, PromptCall::ShowWait(_))).count();
        let hidden = calls.iter().filter(|c| matches!(c, PromptCall::HideWait)).count();
        shown > hidden
    }
}

impl UserPrompt for HeadlessPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        self.calls.lock().push(PromptCall::Confirm { title: title.to_string(), message: message.to_string() });
        *self.answer.lock()
    }

    fn notify(&self, title: &str, message: &str) {
        tracing::info!(target: crate::logging::UI, title, message, "notification");
        self.calls.lock().push(PromptCall::Notify { title: title.to_string(), message: message.to_string() });
    }

    fn show_wait(&self, message: &str) { self.calls.lock().push(PromptCall::ShowWait(message.to_string())); }

    fn hide_wait(&self) { self.calls.lock().push(PromptCall::HideWait); }

    fn pick_folder(&self) -> Option<PathBuf> { self.folder.lock().clone() }
}

/// A shell call recorded by [`HeadlessShell`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCall {
    Launch { target: String, arguments: Option<String>, elevated: bool },
    Reveal(String),
    Copy(String),
}

/// Records shell requests instead of performing them.
#[derive(Default)]
pub struct HeadlessShell {
    calls: Mutex<Vec<ShellCall>>,
}

impl HeadlessShell {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn calls(&self) -> Vec<ShellCall> { self.calls.lock().clone() }
}

impl ShellActions for HeadlessShell {
    fn launch(&self, target: &str, arguments: Option<&str>, elevated: bool) -> io::Result<()> {
        self.calls.lock().push(ShellCall::Launch {
            target: target.to_string(),
            arguments: arguments.map(str::to_string),
            elevated,
        });
        Ok(())
    }

    fn reveal(&self, path: &str) -> io::Result<()> {
        self.calls.lock().push(ShellCall::Reveal(path.to_string()));
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> io::Result<()> {
        self.calls.lock().push(ShellCall::Copy(text.to_string()));
        Ok(())
    }
}
