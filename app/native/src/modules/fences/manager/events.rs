//! Events reported by fence windows.
//!
//! The host translates raw input into these events and hands them to
//! [`super::FenceManager::handle_event`] together with the fence id.

use std::path::PathBuf;

use crate::modules::fences::window::{ItemAction, MenuAction};

/// A user gesture on one fence window.
#[derive(Clone, Debug, PartialEq)]
pub enum FenceEvent {
    // ════════════════════════════════════════════════════════════════════════
    // Title
    // ════════════════════════════════════════════════════════════════════════
    /// Title region clicked. With the roll modifier held this toggles roll.
    TitleClicked { modifier: bool },

    /// Title region double-clicked: enter rename mode.
    TitleDoubleClicked,

    /// Rename committed with Enter or focus loss.
    TitleEditCommitted(String),

    /// Rename abandoned with Escape.
    TitleEditCancelled,

    // ════════════════════════════════════════════════════════════════════════
    // Geometry
    // ════════════════════════════════════════════════════════════════════════
    /// The user dragged the title to a new position.
    Dragged { x: f64, y: f64 },

    /// The user released a title drag.
    DragFinished,

    /// The window reported its new size.
    SizeChanged { width: f64, height: f64 },

    // ════════════════════════════════════════════════════════════════════════
    // Chrome
    // ════════════════════════════════════════════════════════════════════════
    /// Lock indicator clicked.
    LockClicked,

    /// A fence context menu entry was chosen.
    MenuInvoked(MenuAction),

    // ════════════════════════════════════════════════════════════════════════
    // Content
    // ════════════════════════════════════════════════════════════════════════
    /// An icon was clicked. `index` is the visual position.
    ItemActivated { index: usize, double_click: bool },

    /// An item context menu entry was chosen. `index` is the visual position.
    ItemMenuInvoked { index: usize, action: ItemAction },

    /// Files were dropped onto the fence.
    FilesDropped(Vec<PathBuf>),

    /// The note text changed.
    NoteEdited(String),

    /// A tab header was clicked.
    TabSelected(usize),

    /// The mirrored folder of a Portal fence changed on disk.
    PortalChanged,
}

impl FenceEvent {
    /// Returns the event name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TitleClicked { .. } => "TitleClicked",
            Self::TitleDoubleClicked => "TitleDoubleClicked",
            Self::TitleEditCommitted(_) => "TitleEditCommitted",
            Self::TitleEditCancelled => "TitleEditCancelled",
            Self::Dragged { .. } => "Dragged",
            Self::DragFinished => "DragFinished",
            Self::SizeChanged { .. } => "SizeChanged",
            Self::LockClicked => "LockClicked",
            Self::MenuInvoked(_) => "MenuInvoked",
            Self::ItemActivated { .. } => "ItemActivated",
            Self::ItemMenuInvoked { .. } => "ItemMenuInvoked",
            Self::FilesDropped(_) => "FilesDropped",
            Self::NoteEdited(_) => "NoteEdited",
            Self::TabSelected(_) => "TabSelected",
            Self::PortalChanged => "PortalChanged",
        }
    }
}
