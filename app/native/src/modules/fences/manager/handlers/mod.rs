//! Window event handlers.
//!
//! Each module handles one category of [`super::FenceEvent`]:
//! - `title` - roll toggle and in-place rename
//! - `geometry` - drag, snap, and resize
//! - `chrome` - lock indicator and the fence context menu
//! - `items` - item launch and the item context menu
//! - `drop` - files dropped onto a fence
//! - `content` - notes, tabs, and Portal refreshes
//!
//! Handlers never write records directly; every change goes through
//! [`super::FenceManager::update_property`].

pub mod chrome;
pub mod content;
pub mod drop;
pub mod geometry;
pub mod items;
pub mod title;

pub use chrome::{on_lock_clicked, on_menu_invoked};
pub use content::{add_tab, on_note_edited, on_portal_changed, on_tab_selected, toggle_tabs};
pub use drop::{item_for_drop, on_files_dropped};
pub use geometry::{on_drag_finished, on_dragged, on_size_changed};
pub use items::{launch_item, on_item_activated, on_item_menu_invoked};
pub use title::{on_title_clicked, on_title_double_clicked, on_title_edit_cancelled, on_title_edit_committed, toggle_roll};
