//! Item launch and item context menu handlers.

use std::fs;
use std::path::Path;

use crate::modules::fences::manager::{FenceManager, FenceProperty};
use crate::modules::fences::portal::PortalEntry;
use crate::modules::fences::shortcuts::{ShortcutTarget, resolve_target};
use crate::modules::fences::state::{ItemRecord, ItemsType};
use crate::modules::fences::window::{CopyPathKind, ItemAction, is_item_action_enabled, item_menu};
use crate::platform::path::{is_executable, is_network_path, is_web_link};

const LOG: &str = crate::logging::ICONS;

// ============================================================================
// Launch
// ============================================================================

/// Handles a click on an icon. `index` is the visual position.
///
/// With single-click launching a single click opens the item; otherwise a
/// double click does.
pub fn on_item_activated(manager: &mut FenceManager, id: &str, index: usize, double_click: bool) {
    if double_click == manager.config.behavior.single_click_to_launch {
        return;
    }

    match manager.windows.get(id).map(|window| (window.kind(), window.item_index(index))) {
        Some((ItemsType::Portal, _)) => {
            if let Some(entry) = portal_entry(manager, id, index) {
                let path = entry.path.to_string_lossy().into_owned();
                shell_launch(manager, id, &path, None, false);
            }
        }
        Some((ItemsType::Data, Some(item_index))) => {
            launch_item(manager, id, item_index);
        }
        _ => {}
    }
}

/// Opens an item of the active item list.
///
/// A missing local target marks the icon broken and tells the user instead.
/// Returns whether the item was launched.
pub fn launch_item(manager: &mut FenceManager, id: &str, item_index: usize) -> bool {
    let Some((item, target)) = item_with_target(manager, id, item_index) else {
        return false;
    };

    if target_is_missing(manager, &item, &target.target) {
        tracing::warn!(target: LOG, fence_id = %id, target_path = %target.target, "launch target is missing");
        if let Some(window) = manager.windows.get_mut(id) {
            window.set_item_broken(item_index, true);
        }
        manager
            .services
            .prompt
            .notify("Target not found", &format!("\"{}\" no longer exists.", target.target));
        return false;
    }

    let effect = manager
        .record(id)
        .and_then(|record| record.custom_launch_effect())
        .unwrap_or(manager.config.appearance.launch_effect);
    if let Some(window) = manager.windows.get_mut(id) {
        window.play_launch_effect(item_index, effect);
    }

    let arguments = item.arguments.clone().or(target.arguments);
    shell_launch(manager, id, &target.target, arguments.as_deref(), false)
}

fn target_is_missing(manager: &FenceManager, item: &ItemRecord, target: &str) -> bool {
    if is_web_link(target) {
        return false;
    }
    if (item.is_network() || is_network_path(target)) && !manager.config.behavior.check_network_paths {
        return false;
    }
    !Path::new(target).exists()
}

fn shell_launch(manager: &FenceManager, id: &str, target: &str, arguments: Option<&str>, elevated: bool) -> bool {
    match manager.services.shell.launch(target, arguments, elevated) {
        Ok(()) => {
            tracing::info!(target: LOG, fence_id = %id, target_path = %target, elevated, "item launched");
            true
        }
        Err(err) => {
            tracing::warn!(target: LOG, fence_id = %id, target_path = %target, error = %err, "launch failed");
            manager.services.prompt.notify("Could not open item", &err.to_string());
            false
        }
    }
}

// ============================================================================
// Item Menu
// ============================================================================

/// Runs an item context menu entry. `index` is the visual position.
pub fn on_item_menu_invoked(manager: &mut FenceManager, id: &str, index: usize, action: ItemAction) {
    match manager.windows.get(id).map(|window| (window.kind(), window.item_index(index))) {
        Some((ItemsType::Portal, _)) => on_portal_item_action(manager, id, index, &action),
        Some((ItemsType::Data, Some(item_index))) => on_data_item_action(manager, id, item_index, action),
        _ => {}
    }
}

fn on_data_item_action(manager: &mut FenceManager, id: &str, item_index: usize, action: ItemAction) {
    let Some((item, target)) = item_with_target(manager, id, item_index) else {
        return;
    };

    let destinations: Vec<(String, String)> = manager
        .store
        .records()
        .iter()
        .filter(|record| record.id != id && record.items_type == ItemsType::Data)
        .map(|record| (record.id.clone(), record.title.clone()))
        .collect();
    if !is_item_action_enabled(&item_menu(&item, &target.target, &destinations), &action) {
        tracing::warn!(target: LOG, fence_id = %id, action = ?action, "item action not available");
        return;
    }

    match action {
        ItemAction::EditDisplayName(name) => rename_item(manager, id, item_index, &name),
        ItemAction::MoveTo(destination) => move_item(manager, id, item_index, &destination),
        ItemAction::Remove => remove_item(manager, id, item_index),
        ItemAction::RunAsAdmin => {
            let arguments = item.arguments.clone().or(target.arguments);
            shell_launch(manager, id, &target.target, arguments.as_deref(), true);
        }
        ItemAction::OpenContainingFolder => reveal(manager, id, &target.target),
        ItemAction::CopyPath(kind) => copy_path(manager, id, &target.target, kind),
    }
}

fn on_portal_item_action(manager: &FenceManager, id: &str, index: usize, action: &ItemAction) {
    let Some(entry) = portal_entry(manager, id, index) else {
        return;
    };
    let path = entry.path.to_string_lossy().into_owned();

    match action {
        ItemAction::RunAsAdmin if !entry.is_dir && is_executable(&entry.path) => {
            shell_launch(manager, id, &path, None, true);
        }
        ItemAction::OpenContainingFolder => reveal(manager, id, &path),
        ItemAction::CopyPath(kind) => copy_path(manager, id, &path, *kind),
        _ => {
            tracing::warn!(target: LOG, fence_id = %id, action = ?action, "item action not available in portal");
        }
    }
}

fn rename_item(manager: &mut FenceManager, id: &str, item_index: usize, name: &str) {
    let Some(mut items) = manager.record(id).map(|record| record.active_items().to_vec()) else {
        return;
    };
    let Some(item) = items.get_mut(item_index) else {
        return;
    };

    let name = name.trim();
    item.display_name = (!name.is_empty()).then(|| name.to_string());
    manager.update_property(id, FenceProperty::Items(items));
}

/// Moves an item into another Data fence.
///
/// The destination is written first so a failure never loses the item.
fn move_item(manager: &mut FenceManager, id: &str, item_index: usize, destination: &str) {
    if manager.is_transitioning(id) || manager.is_transitioning(destination) {
        tracing::debug!(target: LOG, fence_id = %id, destination, "move ignored while rolling");
        return;
    }
    let Some(mut source_items) = manager.record(id).map(|record| record.active_items().to_vec()) else {
        return;
    };
    let Some(mut destination_items) = manager.record(destination).map(|record| record.active_items().to_vec())
    else {
        return;
    };
    if item_index >= source_items.len() {
        return;
    }

    let mut item = source_items.remove(item_index);
    item.display_order = None;
    destination_items.push(item);

    if !manager.update_property(destination, FenceProperty::Items(destination_items)).is_applied() {
        tracing::warn!(target: LOG, fence_id = %id, destination, "move failed, item kept in place");
        return;
    }
    manager.update_property(id, FenceProperty::Items(source_items));
    tracing::info!(target: LOG, fence_id = %id, destination, "item moved");
}

/// Removes an item. A shortcut this app created is deleted once no fence
/// references it any more.
fn remove_item(manager: &mut FenceManager, id: &str, item_index: usize) {
    let Some(mut items) = manager.record(id).map(|record| record.active_items().to_vec()) else {
        return;
    };
    if item_index >= items.len() {
        return;
    }

    if let Some(window) = manager.windows.get_mut(id) {
        window.fade_out_item(item_index);
    }
    let removed = items.remove(item_index);
    if !manager.update_property(id, FenceProperty::Items(items)).is_applied() {
        return;
    }
    delete_managed_shortcut(manager, &removed.filename);
}

fn delete_managed_shortcut(manager: &FenceManager, filename: &str) {
    let path = Path::new(filename);
    if !path.starts_with(&manager.shortcuts_dir) || !path.is_file() {
        return;
    }
    let referenced = manager.store.records().iter().any(|record| {
        record
            .items()
            .iter()
            .chain(record.tabs.iter().flat_map(|tab| tab.items.iter()))
            .any(|item| item.filename == filename)
    });
    if referenced {
        return;
    }

    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(target: LOG, shortcut = %filename, "shortcut deleted"),
        Err(err) => {
            tracing::warn!(target: LOG, shortcut = %filename, error = %err, "failed to delete shortcut");
            manager.services.prompt.notify("Could not delete shortcut", &err.to_string());
        }
    }
}

fn reveal(manager: &FenceManager, id: &str, target: &str) {
    if let Err(err) = manager.services.shell.reveal(target) {
        tracing::warn!(target: LOG, fence_id = %id, target_path = %target, error = %err, "reveal failed");
        manager.services.prompt.notify("Could not open folder", &err.to_string());
    }
}

fn copy_path(manager: &FenceManager, id: &str, target: &str, kind: CopyPathKind) {
    let text = match kind {
        CopyPathKind::Full => target.to_string(),
        CopyPathKind::Folder => {
            Path::new(target).parent().map_or_else(|| target.to_string(), |p| p.to_string_lossy().into_owned())
        }
    };
    if let Err(err) = manager.services.shell.copy_to_clipboard(&text) {
        tracing::warn!(target: LOG, fence_id = %id, error = %err, "copy to clipboard failed");
    }
}

// ============================================================================
// Lookup
// ============================================================================

fn item_with_target(manager: &FenceManager, id: &str, item_index: usize) -> Option<(ItemRecord, ShortcutTarget)> {
    let item = manager.record(id)?.active_items().get(item_index)?.clone();
    let target = resolve_target(manager.services.resolver.as_ref(), &item.filename);
    Some((item, target))
}

fn portal_entry(manager: &FenceManager, id: &str, index: usize) -> Option<PortalEntry> {
    let mirror = manager.windows.get(id)?.portal()?;
    match mirror.entries() {
        Ok(entries) => entries.into_iter().nth(index),
        Err(err) => {
            tracing::warn!(target: LOG, fence_id = %id, error = %err, "failed to list portal folder");
            None
        }
    }
}
