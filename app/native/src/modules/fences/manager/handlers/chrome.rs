//! Lock indicator and fence context menu handlers.

use std::time::Instant;

use super::content::{add_tab, toggle_tabs};
use crate::modules::fences::manager::{FenceManager, FenceProperty};
use crate::modules::fences::window::MenuAction;

const LOG: &str = crate::logging::UI;

pub fn on_lock_clicked(manager: &mut FenceManager, id: &str) {
    let Some(locked) = manager.record(id).map(|record| record.is_locked()) else {
        return;
    };
    manager.update_property(id, FenceProperty::IsLocked(!locked));
}

/// Runs a fence context menu entry. Entries the menu does not offer for this
/// fence are ignored.
pub fn on_menu_invoked(manager: &mut FenceManager, id: &str, action: MenuAction) {
    let offered = manager.windows.get(id).is_some_and(|window| window.menu().offers(&action));
    if !offered {
        tracing::warn!(target: LOG, fence_id = %id, action = ?action, "menu action not offered for fence");
        return;
    }

    match action {
        MenuAction::SetColor(color) => {
            manager.update_property(id, FenceProperty::CustomColor(color));
        }
        MenuAction::SetLaunchEffect(effect) => {
            manager.update_property(id, FenceProperty::CustomLaunchEffect(effect));
        }
        MenuAction::Hide => {
            manager.hide_fence(id);
        }
        MenuAction::Delete => {
            manager.delete_fence(id);
        }
        MenuAction::PeekBehind => manager.peek_behind(Instant::now()),
        MenuAction::OpenPortalFolder => open_portal_folder(manager, id),
        MenuAction::ToggleTabs => toggle_tabs(manager, id),
        MenuAction::AddTab(name) => add_tab(manager, id, &name),
    }
}

fn open_portal_folder(manager: &FenceManager, id: &str) {
    let Some(path) = manager.record(id).and_then(|record| record.path.clone()) else {
        return;
    };
    if let Err(err) = manager.services.shell.launch(path.trim(), None, false) {
        tracing::warn!(target: LOG, fence_id = %id, path = %path, error = %err, "failed to open portal folder");
        manager.services.prompt.notify("Could not open folder", &err.to_string());
    }
}
