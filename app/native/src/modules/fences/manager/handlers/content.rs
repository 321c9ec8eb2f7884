//! Note, tab, and Portal content handlers.

use crate::modules::fences::manager::{FenceManager, FenceProperty};
use crate::modules::fences::state::{ItemRecord, ItemsType, TabRecord};

const LOG: &str = crate::logging::UI;
const FIRST_TAB_NAME: &str = "Main";

pub fn on_note_edited(manager: &mut FenceManager, id: &str, text: String) {
    manager.update_property(id, FenceProperty::NoteContent(text));
}

pub fn on_tab_selected(manager: &mut FenceManager, id: &str, tab: usize) {
    manager.update_property(id, FenceProperty::CurrentTab(Some(tab)));
}

/// Turns tabs on or off for a Data fence.
///
/// Enabling moves the current items into a first tab; disabling merges
/// every tab back into the plain item list. No item is lost either way.
pub fn toggle_tabs(manager: &mut FenceManager, id: &str) {
    if manager.is_transitioning(id) {
        return;
    }
    let Some(record) = manager.record(id).filter(|record| record.items_type == ItemsType::Data) else {
        return;
    };

    if record.tabs_enabled() {
        let merged: Vec<ItemRecord> = record
            .items()
            .iter()
            .chain(record.tabs.iter().flat_map(|tab| tab.items.iter()))
            .cloned()
            .collect();

        manager.update_property(id, FenceProperty::TabsEnabled(false));
        manager.update_property(id, FenceProperty::Items(merged));
        manager.update_property(id, FenceProperty::Tabs(Vec::new()));
        manager.update_property(id, FenceProperty::CurrentTab(None));
        tracing::info!(target: LOG, fence_id = %id, "tabs disabled");
    } else {
        let mut first = TabRecord::new(FIRST_TAB_NAME);
        first.items = record.items().to_vec();
        let mut tabs = vec![first];
        tabs.extend(record.tabs.iter().cloned());

        manager.update_property(id, FenceProperty::Tabs(tabs));
        manager.update_property(id, FenceProperty::Items(Vec::new()));
        manager.update_property(id, FenceProperty::TabsEnabled(true));
        manager.update_property(id, FenceProperty::CurrentTab(Some(0)));
        tracing::info!(target: LOG, fence_id = %id, "tabs enabled");
    }
}

/// Appends a tab and switches to it. A blank name becomes `Tab N`.
pub fn add_tab(manager: &mut FenceManager, id: &str, name: &str) {
    let Some(record) = manager.record(id).filter(|record| record.tabs_enabled()) else {
        return;
    };

    let mut tabs = record.tabs.clone();
    let name = name.trim();
    let name = if name.is_empty() { format!("Tab {}", tabs.len() + 1) } else { name.to_string() };
    tabs.push(TabRecord::new(name));
    let current = tabs.len() - 1;

    manager.update_property(id, FenceProperty::Tabs(tabs));
    manager.update_property(id, FenceProperty::CurrentTab(Some(current)));
}

pub fn on_portal_changed(manager: &mut FenceManager, id: &str) {
    if let Some(window) = manager.windows.get_mut(id) {
        window.refresh_portal();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::modules::fences::manager::FenceEvent;
    use crate::modules::fences::manager::testing::Harness;
    use crate::modules::fences::window::MenuAction;

    fn item(name: &str) -> ItemRecord { ItemRecord::new(format!("/tmp/{name}"), false, false, false) }

    #[test]
    fn test_note_edits_persist() {
        let mut h = Harness::loaded();
        let id = h.manager.create_fence(ItemsType::Note, 300.0, 300.0).unwrap();

        h.manager.handle_event(&id, FenceEvent::NoteEdited("buy milk".to_string()));
        assert_eq!(h.manager.record(&id).unwrap().note_content.as_deref(), Some("buy milk"));
        assert_eq!(h.host.surface(&id).unwrap().note, "buy milk");
    }

    #[test]
    fn test_tabs_round_trip_keeps_items() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::Items(vec![item("a"), item("b")]));

        h.manager.handle_event(&id, FenceEvent::MenuInvoked(MenuAction::ToggleTabs));
        let record = h.manager.record(&id).unwrap();
        assert!(record.tabs_enabled());
        assert!(record.items().is_empty());
        assert_eq!(record.tabs[0].name, FIRST_TAB_NAME);
        assert_eq!(record.active_items().len(), 2);

        h.manager.handle_event(&id, FenceEvent::MenuInvoked(MenuAction::AddTab(String::new())));
        h.manager.update_property(&id, FenceProperty::Items(vec![item("c")]));
        let record = h.manager.record(&id).unwrap();
        assert_eq!(record.tabs[1].name, "Tab 2");
        assert_eq!(record.current_tab, Some(1));
        assert_eq!(h.host.surface(&id).unwrap().tabs, vec!["Main".to_string(), "Tab 2".to_string()]);

        h.manager.handle_event(&id, FenceEvent::TabSelected(0));
        assert_eq!(h.host.surface(&id).unwrap().items.len(), 2);

        h.manager.handle_event(&id, FenceEvent::MenuInvoked(MenuAction::ToggleTabs));
        let record = h.manager.record(&id).unwrap();
        assert!(!record.tabs_enabled());
        assert!(record.tabs.is_empty());
        assert_eq!(record.items().len(), 3);
    }

    #[test]
    fn test_portal_change_refreshes_listing() {
        let mut h = Harness::loaded();
        let folder = h.dir.path().join("Drop");
        fs::create_dir(&folder).unwrap();
        let id = h.manager.create_portal_fence(&folder, 0.0, 0.0).unwrap();
        assert!(h.host.surface(&id).unwrap().items.is_empty());

        fs::write(folder.join("new.txt"), "x").unwrap();
        h.manager.handle_event(&id, FenceEvent::PortalChanged);
        assert_eq!(h.host.surface(&id).unwrap().items[0].label, "new");
    }
}
