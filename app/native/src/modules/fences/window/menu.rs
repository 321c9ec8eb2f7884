//! Fence and item context menus.
//!
//! Menus are plain data: the host renders them and reports the chosen
//! action back as an event.

use std::path::Path;

use crate::config::{FenceColor, LaunchEffect};
use crate::modules::fences::state::{FenceRecord, ItemRecord, ItemsType};
use crate::platform::path::is_executable;

// ============================================================================
// Fence Menu
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// `None` restores the global default.
    SetColor(Option<FenceColor>),
    /// `None` restores the global default.
    SetLaunchEffect(Option<LaunchEffect>),
    Hide,
    Delete,
    PeekBehind,
    OpenPortalFolder,
    ToggleTabs,
    AddTab(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
    pub checked: bool,
}

impl MenuEntry {
    fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self { label: label.into(), action, checked: false }
    }

    fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// The context menu of one fence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FenceMenu {
    pub colors: Vec<MenuEntry>,
    pub launch_effects: Vec<MenuEntry>,
    pub actions: Vec<MenuEntry>,
}

impl FenceMenu {
    /// Builds the menu reflecting the record's current overrides.
    #[must_use]
    pub fn for_record(record: &FenceRecord) -> Self {
        let color = record.custom_color();
        let colors = std::iter::once(MenuEntry::new("Default", MenuAction::SetColor(None)).checked(color.is_none()))
            .chain(FenceColor::ALL.into_iter().map(|c| {
                MenuEntry::new(c.as_str(), MenuAction::SetColor(Some(c))).checked(color == Some(c))
            }))
            .collect();

        let effect = record.custom_launch_effect();
        let launch_effects =
            std::iter::once(MenuEntry::new("Default", MenuAction::SetLaunchEffect(None)).checked(effect.is_none()))
                .chain(LaunchEffect::ALL.into_iter().map(|e| {
                    MenuEntry::new(e.as_str(), MenuAction::SetLaunchEffect(Some(e))).checked(effect == Some(e))
                }))
                .collect();

        let mut actions = vec![
            MenuEntry::new("Hide fence", MenuAction::Hide),
            MenuEntry::new("Peek behind", MenuAction::PeekBehind),
        ];
        match record.items_type {
            ItemsType::Portal => actions.push(MenuEntry::new("Open folder", MenuAction::OpenPortalFolder)),
            ItemsType::Data => {
                let label = if record.tabs_enabled() { "Disable tabs" } else { "Enable tabs" };
                actions.push(MenuEntry::new(label, MenuAction::ToggleTabs).checked(record.tabs_enabled()));
                if record.tabs_enabled() {
                    actions.push(MenuEntry::new("New tab", MenuAction::AddTab(String::new())));
                }
            }
            ItemsType::Note => {}
        }
        actions.push(MenuEntry::new("Delete fence", MenuAction::Delete));

        Self { colors, launch_effects, actions }
    }

    /// Whether `action` is offered by this menu.
    #[must_use]
    pub fn offers(&self, action: &MenuAction) -> bool {
        let offered = |entry: &MenuEntry| match (&entry.action, action) {
            (MenuAction::AddTab(_), MenuAction::AddTab(_)) => true,
            (offered, requested) => offered == requested,
        };
        self.colors.iter().chain(&self.launch_effects).chain(&self.actions).any(offered)
    }

    /// The checked color entry, if any.
    #[must_use]
    pub fn checked_color(&self) -> Option<&MenuEntry> { self.colors.iter().find(|e| e.checked) }
}

// ============================================================================
// Item Menu
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPathKind {
    /// The folder containing the target.
    Folder,
    /// The full target path.
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemAction {
    EditDisplayName(String),
    /// Moves the item into the fence with this id.
    MoveTo(String),
    Remove,
    RunAsAdmin,
    OpenContainingFolder,
    CopyPath(CopyPathKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemMenuEntry {
    pub label: String,
    pub action: ItemAction,
    pub enabled: bool,
}

/// Builds the context menu of one item.
///
/// `target` is the item's resolved target; `destinations` lists
/// `(id, title)` of the other Data fences it can move to.
#[must_use]
pub fn item_menu(item: &ItemRecord, target: &str, destinations: &[(String, String)]) -> Vec<ItemMenuEntry> {
    let local = !item.is_link();
    let entry = |label: String, action: ItemAction, enabled: bool| ItemMenuEntry { label, action, enabled };

    let mut entries = vec![entry("Edit display name".to_string(), ItemAction::EditDisplayName(item.label()), true)];
    entries.extend(
        destinations
            .iter()
            .map(|(id, title)| entry(format!("Move to {title}"), ItemAction::MoveTo(id.clone()), true)),
    );
    entries.push(entry("Remove".to_string(), ItemAction::Remove, true));
    entries.push(entry(
        "Run as administrator".to_string(),
        ItemAction::RunAsAdmin,
        local && !item.is_folder() && is_executable(Path::new(target)),
    ));
    entries.push(entry("Open containing folder".to_string(), ItemAction::OpenContainingFolder, local));
    entries.push(entry("Copy folder path".to_string(), ItemAction::CopyPath(CopyPathKind::Folder), local));
    entries.push(entry("Copy full path".to_string(), ItemAction::CopyPath(CopyPathKind::Full), local));
    entries
}

/// Whether `action` is enabled in `entries`.
#[must_use]
pub fn is_item_action_enabled(entries: &[ItemMenuEntry], action: &ItemAction) -> bool {
    entries.iter().any(|entry| {
        entry.enabled
            && match (&entry.action, action) {
                (ItemAction::EditDisplayName(_), ItemAction::EditDisplayName(_)) => true,
                (offered, requested) => offered == requested,
            }
    })
}
