//! The fence manager.
//!
//! [`FenceManager`] owns the record store, every live [`FenceWindow`], the
//! transition guard and the hidden-fence registry. It lives on the UI
//! thread; background work reaches it only through a [`UiSender`].
//!
//! - `pipeline` - the property update pipeline
//! - `lifecycle` - load, create, delete, reload, animation ticks, watchdog
//! - `targets` - target poller registrations and broken-icon updates
//! - `handlers` - window event handlers

pub mod events;
pub mod handlers;
mod lifecycle;
mod pipeline;
mod targets;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub use events::FenceEvent;
pub use lifecycle::{PreparedRecords, prepare_records};
pub use pipeline::{FenceProperty, PropertyError, UpdateOutcome};

use super::guard::TransitionGuard;
use super::hidden::{HiddenFence, HiddenRegistry};
use super::host::{HeadlessPrompt, HeadlessShell, ShellActions, UserPrompt, WindowHost};
use super::poller::{TargetPoller, ThreadedPoller};
use super::shortcuts::{InternetShortcutResolver, ShortcutResolver};
use super::state::{FenceRecord, FenceStore};
use super::window::FenceWindow;
use crate::config::FencesConfig;
use crate::platform::{RepeatingTask, UiSender};

/// The collaborators the manager calls out to.
#[derive(Clone)]
pub struct Services {
    pub poller: Arc<dyn TargetPoller>,
    pub resolver: Arc<dyn ShortcutResolver>,
    pub prompt: Arc<dyn UserPrompt>,
    pub shell: Arc<dyn ShellActions>,
}

impl Services {
    /// In-memory collaborators: an idle poller, the internet-shortcut
    /// resolver, a prompt that answers `confirm`, and a recording shell.
    #[must_use]
    pub fn headless(confirm: bool) -> Self {
        Self {
            poller: Arc::new(ThreadedPoller::new()),
            resolver: Arc::new(InternetShortcutResolver),
            prompt: Arc::new(HeadlessPrompt::new(confirm)),
            shell: Arc::new(HeadlessShell::new()),
        }
    }
}

pub struct FenceManager {
    store: FenceStore,
    guard: TransitionGuard,
    windows: HashMap<String, FenceWindow>,
    hidden: HiddenRegistry,
    /// Poll targets last reported missing.
    broken_targets: HashSet<String>,
    config: FencesConfig,
    host: Box<dyn WindowHost>,
    services: Services,
    ui: Option<UiSender<Self>>,
    shortcuts_dir: PathBuf,
    peek_until: Option<Instant>,
    watchdog: Option<RepeatingTask>,
    reloading: bool,
}

impl std::fmt::Debug for FenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FenceManager")
            .field("document", &self.store.path())
            .field("fences", &self.store.len())
            .field("windows", &self.windows.len())
            .field("guard", &self.guard)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl FenceManager {
    /// Creates a manager for the document configured in `config`.
    ///
    /// Nothing is read until [`Self::load`].
    #[must_use]
    pub fn new(config: FencesConfig, host: Box<dyn WindowHost>, services: Services) -> Self {
        Self {
            store: FenceStore::new(config.document_path()),
            guard: TransitionGuard::new(),
            windows: HashMap::new(),
            hidden: HiddenRegistry::new(),
            broken_targets: HashSet::new(),
            shortcuts_dir: config.shortcuts_dir(),
            config,
            host,
            services,
            ui: None,
            peek_until: None,
            watchdog: None,
            reloading: false,
        }
    }

    /// Connects the UI queue background work posts to.
    ///
    /// Attach before [`Self::load`] so folder watchers and poller callbacks
    /// of the opened windows can reach the manager.
    pub fn attach_ui(&mut self, sender: UiSender<Self>) { self.ui = Some(sender); }

    // ========================================================================
    // Queries
    // ========================================================================

    /// A copy of every record, in document order.
    #[must_use]
    pub fn get_all_records(&self) -> Vec<FenceRecord> { self.store.snapshot() }

    #[must_use]
    pub fn record(&self, id: &str) -> Option<&FenceRecord> { self.store.find_by_id(id) }

    #[must_use]
    pub fn window(&self, id: &str) -> Option<&FenceWindow> { self.windows.get(id) }

    /// Ids of every fence with a live window, in document order.
    #[must_use]
    pub fn window_ids(&self) -> Vec<String> {
        self.store
            .records()
            .iter()
            .filter(|record| self.windows.contains_key(&record.id))
            .map(|record| record.id.clone())
            .collect()
    }

    #[must_use]
    pub fn hidden_fences(&self) -> &[HiddenFence] { self.hidden.list() }

    /// Whether `id` is currently rolling.
    #[must_use]
    pub fn is_transitioning(&self, id: &str) -> bool { self.guard.is_active(id) }

    #[must_use]
    pub const fn config(&self) -> &FencesConfig { &self.config }

    #[must_use]
    pub const fn services(&self) -> &Services { &self.services }

    #[must_use]
    pub fn document_path(&self) -> &std::path::Path { self.store.path() }

    // ========================================================================
    // Events
    // ========================================================================

    /// Runs the handler for a window event.
    ///
    /// Panics are caught here and logged with the fence id and event name.
    pub fn handle_event(&mut self, id: &str, event: FenceEvent) {
        let name = event.name();
        let result = catch_unwind(AssertUnwindSafe(|| self.dispatch(id, event)));

        if let Err(panic) = result {
            tracing::error!(
                target: crate::logging::UI,
                fence_id = %id,
                event = name,
                panic = %panic_message(panic.as_ref()),
                "event handler panicked, operation abandoned"
            );
        }
    }

    fn dispatch(&mut self, id: &str, event: FenceEvent) {
        if !self.windows.contains_key(id) {
            tracing::warn!(target: crate::logging::UI, fence_id = %id, event = event.name(), "event for unknown fence window");
            return;
        }

        match event {
            FenceEvent::TitleClicked { modifier } => handlers::on_title_clicked(self, id, modifier),
            FenceEvent::TitleDoubleClicked => handlers::on_title_double_clicked(self, id),
            FenceEvent::TitleEditCommitted(title) => handlers::on_title_edit_committed(self, id, &title),
            FenceEvent::TitleEditCancelled => handlers::on_title_edit_cancelled(self, id),
            FenceEvent::Dragged { x, y } => handlers::on_dragged(self, id, x, y),
            FenceEvent::DragFinished => handlers::on_drag_finished(self, id),
            FenceEvent::SizeChanged { width, height } => handlers::on_size_changed(self, id, width, height),
            FenceEvent::LockClicked => handlers::on_lock_clicked(self, id),
            FenceEvent::MenuInvoked(action) => handlers::on_menu_invoked(self, id, action),
            FenceEvent::ItemActivated { index, double_click } => {
                handlers::on_item_activated(self, id, index, double_click);
            }
            FenceEvent::ItemMenuInvoked { index, action } => handlers::on_item_menu_invoked(self, id, index, action),
            FenceEvent::FilesDropped(paths) => handlers::on_files_dropped(self, id, &paths),
            FenceEvent::NoteEdited(text) => handlers::on_note_edited(self, id, text),
            FenceEvent::TabSelected(tab) => handlers::on_tab_selected(self, id, tab),
            FenceEvent::PortalChanged => handlers::on_portal_changed(self, id),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Writes the whole store. Failures are logged, never raised.
    fn persist(&self) -> bool {
        match self.store.save() {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(target: crate::logging::GENERAL, error = %err, "failed to save fence document");
                false
            }
        }
    }
}

/// Extracts the message of a caught panic.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
