//! Fence window controller.
//!
//! A [`FenceWindow`] owns everything live about one fence: its surface, its
//! roll state machine, its menu, its target-poller registrations and, for
//! Portal fences, the folder mirror. Closing the window releases all of it.
//! The window never writes the record; record changes go through the
//! manager's property pipeline.

pub mod menu;
pub mod style;

use std::time::{Duration, Instant};

use thiserror::Error;

pub use self::menu::{CopyPathKind, FenceMenu, ItemAction, MenuAction, is_item_action_enabled, item_menu};
pub use self::style::{ChromeStyle, ItemVisual};
use super::animation::{RollDirection, RollError, RollFrame, RollMachine, RollState};
use super::host::FenceSurface;
use super::portal::{PortalMirror, is_valid_portal_path};
use super::state::{FenceRecord, ItemsType, Rect, display_order};
use crate::config::AppearanceConfig;
use crate::constants::COLLAPSED_HEIGHT;

const LOCKED_TOOLTIP: &str = "Fence is locked. Click to unlock.";
const UNLOCKED_TOOLTIP: &str = "Fence is unlocked. Click to lock.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("Portal fence {id} has no usable folder: {path:?}")]
    InvalidPortal { id: String, path: Option<String> },
}

pub struct FenceWindow {
    id: String,
    kind: ItemsType,
    surface: Box<dyn FenceSurface>,
    roll: RollMachine,
    renaming: bool,
    menu: FenceMenu,
    /// Display order: visual index -> index into the active item list.
    item_order: Vec<usize>,
    poll_targets: Vec<String>,
    portal: Option<PortalMirror>,
    closed: bool,
}

impl std::fmt::Debug for FenceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FenceWindow")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("roll", &self.roll.state())
            .field("renaming", &self.renaming)
            .field("poll_targets", &self.poll_targets.len())
            .field("portal", &self.portal)
            .finish_non_exhaustive()
    }
}

impl FenceWindow {
    /// Builds the window for `record` and lays it out from the persisted
    /// state, without animation.
    ///
    /// Portal fences whose folder is missing are rejected.
    pub fn open(
        record: &FenceRecord,
        mut surface: Box<dyn FenceSurface>,
        appearance: &AppearanceConfig,
    ) -> Result<Self, WindowError> {
        if record.items_type == ItemsType::Portal && !is_valid_portal_path(record.path.as_deref()) {
            surface.close();
            return Err(WindowError::InvalidPortal { id: record.id.clone(), path: record.path.clone() });
        }

        let rolled = record.is_rolled();
        let height = if rolled { COLLAPSED_HEIGHT } else { record.height };

        surface.set_title(&record.title);
        surface.apply_chrome(&ChromeStyle::resolve(record, appearance));
        surface.set_bounds(Rect::new(record.x, record.y, record.width, height));
        surface.set_content_visible(!rolled);
        surface.set_lock_indicator(record.is_locked(), lock_tooltip(record.is_locked()));
        surface.set_resizable(!record.is_locked());

        let menu = FenceMenu::for_record(record);
        surface.set_menu(&menu);

        let mut window = Self {
            id: record.id.clone(),
            kind: record.items_type,
            surface,
            roll: RollMachine::from_rolled(rolled),
            renaming: false,
            menu,
            item_order: Vec::new(),
            poll_targets: Vec::new(),
            portal: None,
            closed: false,
        };

        match record.items_type {
            ItemsType::Data => window.refresh_items(record),
            ItemsType::Note => window.surface.set_note_text(record.note_content.as_deref().unwrap_or_default()),
            ItemsType::Portal => {}
        }
        window.surface.set_visible(!record.is_hidden());

        tracing::debug!(
            target: crate::logging::UI,
            fence_id = %record.id,
            kind = %record.items_type,
            rolled,
            "fence window opened"
        );
        Ok(window)
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    #[must_use]
    pub const fn kind(&self) -> ItemsType { self.kind }

    #[must_use]
    pub fn bounds(&self) -> Rect { self.surface.bounds() }

    #[must_use]
    pub const fn roll_state(&self) -> RollState { self.roll.state() }

    #[must_use]
    pub const fn is_renaming(&self) -> bool { self.renaming }

    #[must_use]
    pub const fn menu(&self) -> &FenceMenu { &self.menu }

    #[must_use]
    pub const fn is_closed(&self) -> bool { self.closed }

    // ========================================================================
    // Layout
    // ========================================================================

    pub fn set_bounds(&mut self, bounds: Rect) { self.surface.set_bounds(bounds); }

    pub fn set_position(&mut self, x: f64, y: f64) {
        let bounds = self.surface.bounds();
        self.surface.set_bounds(Rect::new(x, y, bounds.width, bounds.height));
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        let bounds = self.surface.bounds();
        self.surface.set_bounds(Rect::new(bounds.x, bounds.y, width, height));
    }

    pub fn set_visible(&mut self, visible: bool) { self.surface.set_visible(visible); }

    pub fn set_title(&mut self, title: &str) { self.surface.set_title(title); }

    pub fn set_locked(&mut self, locked: bool) {
        self.surface.set_lock_indicator(locked, lock_tooltip(locked));
        self.surface.set_resizable(!locked);
    }

    pub fn set_note_text(&mut self, text: &str) { self.surface.set_note_text(text); }

    /// Re-tints the chrome and rebuilds the menu after an override changed.
    pub fn restyle(&mut self, record: &FenceRecord, appearance: &AppearanceConfig) {
        self.surface.apply_chrome(&ChromeStyle::resolve(record, appearance));
        self.rebuild_menu(record);
    }

    pub fn rebuild_menu(&mut self, record: &FenceRecord) {
        self.menu = FenceMenu::for_record(record);
        self.surface.set_menu(&self.menu);
    }

    // ========================================================================
    // Title Editing
    // ========================================================================

    pub fn begin_rename(&mut self) {
        if !self.renaming {
            self.renaming = true;
            self.surface.begin_title_edit();
        }
    }

    /// Leaves rename mode. Returns whether rename mode was active.
    pub fn end_rename(&mut self) -> bool {
        if !self.renaming {
            return false;
        }
        self.renaming = false;
        self.surface.end_title_edit();
        true
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Re-renders the active item list (and tab strip) of a Data fence.
    pub fn refresh_items(&mut self, record: &FenceRecord) {
        let items = record.active_items();
        self.item_order = display_order(items);
        let visuals: Vec<ItemVisual> = self.item_order.iter().map(|&i| ItemVisual::from_item(&items[i])).collect();
        self.surface.show_items(&visuals);

        if record.tabs_enabled() {
            let names: Vec<String> = record.tabs.iter().map(|tab| tab.name.clone()).collect();
            self.surface.set_tabs(&names, record.active_tab());
        } else {
            self.surface.set_tabs(&[], None);
        }
    }

    /// Maps a visual position to an index in the active item list.
    #[must_use]
    pub fn item_index(&self, visual_index: usize) -> Option<usize> { self.item_order.get(visual_index).copied() }

    /// Maps an index in the active item list to its visual position.
    #[must_use]
    pub fn visual_index(&self, item_index: usize) -> Option<usize> {
        self.item_order.iter().position(|&i| i == item_index)
    }

    pub fn set_item_broken(&mut self, item_index: usize, broken: bool) {
        if let Some(visual) = self.visual_index(item_index) {
            self.surface.set_item_broken(visual, broken);
        }
    }

    pub fn fade_out_item(&mut self, item_index: usize) {
        if let Some(visual) = self.visual_index(item_index) {
            self.surface.fade_out_item(visual);
        }
    }

    pub fn play_launch_effect(&mut self, item_index: usize, effect: crate::config::LaunchEffect) {
        if let Some(visual) = self.visual_index(item_index) {
            self.surface.play_launch_effect(visual, effect);
        }
    }

    /// Remembers a poller registration so closing the window releases it.
    pub fn track_poll_target(&mut self, path: &str) {
        if !self.poll_targets.iter().any(|p| p == path) {
            self.poll_targets.push(path.to_string());
        }
    }

    /// Forgets a poller registration. Returns whether it was tracked.
    pub fn untrack_poll_target(&mut self, path: &str) -> bool {
        let before = self.poll_targets.len();
        self.poll_targets.retain(|p| p != path);
        self.poll_targets.len() != before
    }

    #[must_use]
    pub fn poll_targets(&self) -> &[String] { &self.poll_targets }

    // ========================================================================
    // Portal
    // ========================================================================

    pub fn attach_portal(&mut self, mirror: PortalMirror) {
        self.portal = Some(mirror);
        self.refresh_portal();
    }

    #[must_use]
    pub const fn portal(&self) -> Option<&PortalMirror> { self.portal.as_ref() }

    /// Re-reads the mirrored folder and shows its entries.
    pub fn refresh_portal(&mut self) {
        let Some(mirror) = &self.portal else {
            return;
        };

        match mirror.entries() {
            Ok(entries) => {
                let visuals: Vec<ItemVisual> = entries.iter().map(ItemVisual::from_portal_entry).collect();
                self.item_order = (0..visuals.len()).collect();
                self.surface.show_items(&visuals);
            }
            Err(err) => {
                tracing::warn!(
                    target: crate::logging::UI,
                    fence_id = %self.id,
                    path = %mirror.path().display(),
                    error = %err,
                    "failed to list portal folder"
                );
            }
        }
    }

    // ========================================================================
    // Roll
    // ========================================================================

    /// Whether the window can start rolling towards `rolled`.
    #[must_use]
    pub fn can_roll(&self, rolled: bool) -> bool {
        let direction = if rolled { RollDirection::Collapsing } else { RollDirection::Expanding };
        self.roll.can_begin(direction)
    }

    /// Starts collapsing from the current window height.
    pub fn begin_collapse(&mut self, now: Instant, duration: Duration) -> Result<(), RollError> {
        let from = self.surface.bounds().height;
        self.roll.begin_collapse(from, now, duration)
    }

    /// Starts expanding towards `to_height`.
    pub fn begin_expand(&mut self, to_height: f64, now: Instant, duration: Duration) -> Result<(), RollError> {
        let from = self.surface.bounds().height;
        self.roll.begin_expand(from, to_height, now, duration)?;
        Ok(())
    }

    /// Applies the animation frame at `now`.
    ///
    /// On the final frame the content region is shown or hidden and the
    /// settled state is returned.
    pub fn advance_roll(&mut self, now: Instant) -> Option<RollState> {
        let frame = self.roll.advance(now)?;
        self.apply_frame(frame)
    }

    /// Jumps a running roll animation to its end.
    pub fn finish_roll(&mut self) -> Option<RollState> {
        let frame = self.roll.finish()?;
        self.apply_frame(frame)
    }

    fn apply_frame(&mut self, frame: RollFrame) -> Option<RollState> {
        self.surface.set_height(frame.height);
        let settled = frame.completed?;
        self.surface.set_content_visible(settled == RollState::Expanded);
        Some(settled)
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool { self.roll.is_transitioning() }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Closes the window and drops its folder watcher.
    ///
    /// Returns the poll targets it was tracking; the caller unregisters the
    /// ones no other window still needs. Safe to call twice.
    pub fn close(&mut self) -> Vec<String> {
        if self.closed {
            return Vec::new();
        }
        let released = std::mem::take(&mut self.poll_targets);
        self.portal = None;
        self.roll.finish();
        self.surface.close();
        self.closed = true;
        tracing::debug!(target: crate::logging::UI, fence_id = %self.id, "fence window closed");
        released
    }
}

const fn lock_tooltip(locked: bool) -> &'static str { if locked { LOCKED_TOOLTIP } else { UNLOCKED_TOOLTIP } }
