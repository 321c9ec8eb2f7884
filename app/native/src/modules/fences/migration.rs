//! Schema migration.
//!
//! Upgrades records read from older documents in place. Every rule is
//! idempotent: running the pass over its own output changes nothing and
//! reports `false`.

use std::collections::HashSet;
use std::path::Path;

use super::portal::is_valid_portal_path;
use super::shortcuts::{ShortcutResolver, resolve_target};
use super::state::{
    FenceRecord, Flag, ItemRecord, ItemsField, ItemsType, fallback_unrolled_height,
    is_valid_unrolled_height, new_id,
};
use crate::config::{FenceColor, LaunchEffect};
use crate::platform::path::{is_network_path, is_web_link};

const LOG: &str = crate::logging::MIGRATION;

/// Migrates every record. Returns the records and whether any changed.
pub fn migrate(
    mut records: Vec<FenceRecord>,
    resolver: &dyn ShortcutResolver,
) -> (Vec<FenceRecord>, bool) {
    let mut seen_ids = HashSet::new();
    let mut modified = false;

    for record in &mut records {
        modified |= migrate_id(record, &mut seen_ids);
        modified |= migrate_legacy_items(record);
        modified |= migrate_flags(record);
        modified |= migrate_unrolled_height(record);
        modified |= migrate_overrides(record);

        let id = record.id.clone();
        for item in record.items_mut() {
            modified |= migrate_item(&id, item, resolver);
        }
        for tab in &mut record.tabs {
            for item in &mut tab.items {
                modified |= migrate_item(&id, item, resolver);
            }
        }
    }

    if modified {
        tracing::info!(target: LOG, fences = records.len(), "fence records migrated");
    }
    (records, modified)
}

/// Splits off Portal fences whose folder is missing.
///
/// Returns `(kept, removed)`.
#[must_use]
pub fn partition_invalid_portals(records: Vec<FenceRecord>) -> (Vec<FenceRecord>, Vec<FenceRecord>) {
    records.into_iter().partition(|record| {
        record.items_type != ItemsType::Portal || is_valid_portal_path(record.path.as_deref())
    })
}

fn migrate_id(record: &mut FenceRecord, seen: &mut HashSet<String>) -> bool {
    let trimmed = record.id.trim();
    if !trimmed.is_empty() && !seen.contains(trimmed) {
        let changed = trimmed.len() != record.id.len();
        if changed {
            record.id = trimmed.to_string();
        }
        seen.insert(record.id.clone());
        return changed;
    }

    let previous = std::mem::replace(&mut record.id, new_id());
    tracing::info!(
        target: LOG,
        previous = %previous,
        fence_id = %record.id,
        title = %record.title,
        "assigned new fence id"
    );
    seen.insert(record.id.clone());
    true
}

fn migrate_legacy_items(record: &mut FenceRecord) -> bool {
    let ItemsField::LegacyPath(path) = &record.items else {
        return false;
    };
    let path = path.clone();
    record.items = ItemsField::default();

    if record.items_type == ItemsType::Portal {
        if record.path.as_deref().is_none_or(|p| p.trim().is_empty()) {
            record.path = Some(path.clone());
        }
        record.is_folder = Some(true);
        tracing::info!(target: LOG, fence_id = %record.id, path = %path, "moved portal path out of Items");
    } else {
        tracing::warn!(
            target: LOG,
            fence_id = %record.id,
            kind = %record.items_type,
            "dropped path-valued Items on a non-portal fence"
        );
    }
    true
}

/// Required flags default to `false`; every flag is rewritten canonically.
fn migrate_flags(record: &mut FenceRecord) -> bool {
    let id = record.id.clone();
    let mut modified = false;

    for (name, flag) in [
        ("IsLocked", &mut record.is_locked),
        ("IsHidden", &mut record.is_hidden),
        ("IsRolled", &mut record.is_rolled),
    ] {
        modified |= normalize_flag(&id, name, flag, true);
    }

    for (name, flag) in [
        ("BoldTitleText", &mut record.bold_title_text),
        ("DisableTextShadow", &mut record.disable_text_shadow),
        ("GrayscaleIcons", &mut record.grayscale_icons),
        ("TabsEnabled", &mut record.tabs_enabled),
    ] {
        modified |= normalize_flag(&id, name, flag, false);
    }

    modified
}

fn normalize_flag(id: &str, name: &str, flag: &mut Option<Flag>, required: bool) -> bool {
    match *flag {
        None if required => {
            *flag = Some(Flag::new(false));
            true
        }
        Some(value) if !value.is_canonical() => {
            tracing::debug!(
                target: LOG,
                fence_id = %id,
                field = name,
                encoding = ?value.encoding(),
                "normalized flag"
            );
            *flag = Some(Flag::new(value.value()));
            true
        }
        _ => false,
    }
}

fn migrate_unrolled_height(record: &mut FenceRecord) -> bool {
    if record.unrolled_height.is_some_and(is_valid_unrolled_height) {
        return false;
    }

    let restored = fallback_unrolled_height(record.height);
    tracing::debug!(
        target: LOG,
        fence_id = %record.id,
        previous = ?record.unrolled_height,
        restored,
        "reset UnrolledHeight"
    );
    record.unrolled_height = Some(restored);
    true
}

/// Unknown override values fall back to the global default; known ones are
/// stored with their canonical spelling.
fn migrate_overrides(record: &mut FenceRecord) -> bool {
    let id = record.id.clone();
    let color = canonical_override(&id, "CustomColor", &mut record.custom_color, |v| {
        FenceColor::parse(v).map(FenceColor::as_str)
    });
    let effect = canonical_override(&id, "CustomLaunchEffect", &mut record.custom_launch_effect, |v| {
        LaunchEffect::parse(v).map(LaunchEffect::as_str)
    });
    color | effect
}

fn canonical_override<F>(id: &str, name: &str, value: &mut Option<String>, canonical: F) -> bool
where F: Fn(&str) -> Option<&'static str> {
    let Some(current) = value.as_deref() else {
        return false;
    };

    match canonical(current) {
        Some(known) if known == current => false,
        Some(known) => {
            *value = Some(known.to_string());
            true
        }
        None => {
            tracing::info!(target: LOG, fence_id = %id, field = name, value = %current, "reset unknown override");
            *value = None;
            true
        }
    }
}

fn migrate_item(fence_id: &str, item: &mut ItemRecord, resolver: &dyn ShortcutResolver) -> bool {
    if item.is_folder.is_some() && item.is_link.is_some() && item.is_network.is_some() {
        return false;
    }

    let target = resolve_target(resolver, &item.filename).target;
    let web_link = is_web_link(&target);

    if item.is_folder.is_none() {
        item.is_folder = Some(!web_link && Path::new(&target).is_dir());
    }
    if item.is_link.is_none() {
        item.is_link = Some(web_link);
    }
    if item.is_network.is_none() {
        item.is_network = Some(!web_link && is_network_path(&target));
    }

    tracing::debug!(
        target: LOG,
        fence_id = %fence_id,
        filename = %item.filename,
        "classified item"
    );
    true
}
