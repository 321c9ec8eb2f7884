//! Files dropped onto a fence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::modules::fences::manager::{FenceManager, FenceProperty};
use crate::modules::fences::shortcuts::{ShortcutResolver, resolve_target};
use crate::modules::fences::state::{ItemRecord, ItemsType};
use crate::platform::path::{is_network_path, is_web_link, unique_path};

const LOG: &str = crate::logging::CREATION;

/// Adds dropped files to a fence.
///
/// Data fences get a managed shortcut per file; Portal fences copy the files
/// into their folder. Note fences ignore drops.
pub fn on_files_dropped(manager: &mut FenceManager, id: &str, paths: &[PathBuf]) {
    let Some(kind) = manager.record(id).map(|record| record.items_type) else {
        return;
    };
    match kind {
        ItemsType::Data => drop_into_data(manager, id, paths),
        ItemsType::Portal => drop_into_portal(manager, id, paths),
        ItemsType::Note => tracing::debug!(target: LOG, fence_id = %id, "drop onto note fence ignored"),
    }
}

fn drop_into_data(manager: &mut FenceManager, id: &str, paths: &[PathBuf]) {
    if manager.is_transitioning(id) {
        tracing::debug!(target: LOG, fence_id = %id, "drop ignored while fence is rolling");
        return;
    }
    let Some(mut items) = manager.record(id).map(|record| record.active_items().to_vec()) else {
        return;
    };

    let resolver = manager.services.resolver.clone();
    let mut failed = Vec::new();
    let before = items.len();
    for path in paths {
        match item_for_drop(resolver.as_ref(), &manager.shortcuts_dir, path) {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!(target: LOG, fence_id = %id, path = %path.display(), error = %err, "dropped file not added");
                failed.push(format!("{}: {err}", path.display()));
            }
        }
    }

    let added = items.len() - before;
    if added > 0 {
        let created: Vec<ItemRecord> = items[before..].to_vec();
        let outcome = manager.update_property(id, FenceProperty::Items(items));
        if outcome.is_applied() {
            tracing::info!(target: LOG, fence_id = %id, added, "items added");
        } else {
            tracing::warn!(target: LOG, fence_id = %id, outcome = ?outcome, "dropped items not stored");
            remove_created_shortcuts(&manager.shortcuts_dir, &created);
        }
    }
    if !failed.is_empty() {
        manager.services.prompt.notify("Some items could not be added", &failed.join("\n"));
    }
}

/// Deletes the shortcut files made for items that never reached the record.
fn remove_created_shortcuts(shortcuts_dir: &Path, items: &[ItemRecord]) {
    for item in items {
        let path = Path::new(&item.filename);
        if !path.starts_with(shortcuts_dir) {
            continue;
        }
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(target: LOG, path = %path.display(), error = %err, "failed to remove unused shortcut");
        }
    }
}

/// Builds the item for one dropped path.
///
/// Shortcut files are copied into `shortcuts_dir` as they are; anything else
/// gets a new shortcut pointing at it.
pub fn item_for_drop(resolver: &dyn ShortcutResolver, shortcuts_dir: &Path, path: &Path) -> io::Result<ItemRecord> {
    if !path.exists() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "file does not exist"));
    }

    if resolver.is_shortcut(path) {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "shortcut has no file name"))?;
        fs::create_dir_all(shortcuts_dir)?;
        let copy = unique_path(shortcuts_dir, name);
        fs::copy(path, &copy)?;

        let filename = copy.to_string_lossy().into_owned();
        let target = resolve_target(resolver, &filename).target;
        let is_folder = Path::new(&target).is_dir();
        return Ok(ItemRecord::new(filename, is_folder, is_web_link(&target), is_network_path(&target)));
    }

    let target = path.to_string_lossy().into_owned();
    let shortcut = resolver.create(shortcuts_dir, &target)?;
    Ok(ItemRecord::new(shortcut.to_string_lossy(), path.is_dir(), false, is_network_path(&target)))
}

fn drop_into_portal(manager: &mut FenceManager, id: &str, paths: &[PathBuf]) {
    let Some(window) = manager.windows.get_mut(id) else {
        return;
    };
    let Some(mirror) = window.portal() else {
        return;
    };

    let mut failed = Vec::new();
    for path in paths {
        if let Err(err) = mirror.copy_in(path) {
            tracing::warn!(target: LOG, fence_id = %id, path = %path.display(), error = %err, "copy into portal failed");
            failed.push(format!("{}: {err}", path.display()));
        }
    }
    window.refresh_portal();

    if !failed.is_empty() {
        manager.services.prompt.notify("Some files could not be copied", &failed.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fences::manager::FenceEvent;
    use crate::modules::fences::manager::testing::Harness;
    use crate::modules::fences::shortcuts::InternetShortcutResolver;

    #[test]
    fn test_item_for_drop_creates_shortcut() {
        let dir = tempfile::tempdir().unwrap();
        let shortcuts = dir.path().join("Shortcuts");
        let file = dir.path().join("budget.xlsx");
        fs::write(&file, "x").unwrap();

        let item = item_for_drop(&InternetShortcutResolver, &shortcuts, &file).unwrap();
        assert!(Path::new(&item.filename).starts_with(&shortcuts));
        assert_eq!(item.label(), "budget");
        assert_eq!(resolve_target(&InternetShortcutResolver, &item.filename).target, file.to_string_lossy());

        let missing = dir.path().join("nope.txt");
        assert!(item_for_drop(&InternetShortcutResolver, &shortcuts, &missing).is_err());
    }

    #[test]
    fn test_drop_adds_items_to_data_fence() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        let a = h.dir.path().join("a.txt");
        let b = h.dir.path().join("b-folder");
        fs::write(&a, "x").unwrap();
        fs::create_dir(&b).unwrap();

        h.manager.handle_event(&id, FenceEvent::FilesDropped(vec![a, b, h.dir.path().join("ghost")]));

        let record = h.manager.record(&id).unwrap();
        assert_eq!(record.items().len(), 2);
        assert!(record.items()[1].is_folder());
        assert_eq!(h.host.surface(&id).unwrap().items.len(), 2);
        assert_eq!(h.prompt.calls().len(), 1);
    }

    #[test]
    fn test_drop_while_rolling_leaves_no_shortcuts() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        let file = h.dir.path().join("doc.txt");
        fs::write(&file, "x").unwrap();

        h.manager.update_property(&id, FenceProperty::IsRolled(true));
        assert!(h.manager.is_transitioning(&id));
        h.manager.handle_event(&id, FenceEvent::FilesDropped(vec![file]));

        assert!(h.manager.record(&id).unwrap().items().is_empty());
        let shortcuts = h.manager.config().shortcuts_dir();
        let leftovers = fs::read_dir(&shortcuts).map_or(0, |entries| entries.count());
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_unstored_drop_removes_its_shortcuts() {
        let dir = tempfile::tempdir().unwrap();
        let shortcuts = dir.path().join("Shortcuts");
        let file = dir.path().join("doc.txt");
        fs::write(&file, "x").unwrap();

        let item = item_for_drop(&InternetShortcutResolver, &shortcuts, &file).unwrap();
        assert!(Path::new(&item.filename).exists());

        remove_created_shortcuts(&shortcuts, std::slice::from_ref(&item));
        assert!(!Path::new(&item.filename).exists());
        assert!(file.exists());
    }

    #[test]
    fn test_drop_copies_into_portal_folder() {
        let mut h = Harness::loaded();
        let folder = h.dir.path().join("Portal");
        fs::create_dir(&folder).unwrap();
        let id = h.manager.create_portal_fence(&folder, 0.0, 0.0).unwrap();

        let source = h.dir.path().join("photo.png");
        fs::write(&source, "png").unwrap();
        h.manager.handle_event(&id, FenceEvent::FilesDropped(vec![source.clone()]));

        assert!(folder.join("photo.png").exists());
        assert!(source.exists());
        assert_eq!(h.host.surface(&id).unwrap().items[0].label, "photo");
    }
}
