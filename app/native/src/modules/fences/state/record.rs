//! Persisted fence and item records.
//!
//! Records keep every key they do not understand in an `extra` map, so a
//! document written by a newer version survives a load/save cycle through
//! this one untouched.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::lenient::{
    number_or_zero, optional_bool, optional_index, optional_integer, optional_number, parse_bool,
    string_or_empty,
};
use super::types::Rect;
use crate::config::{FenceColor, LaunchEffect};
use crate::constants::{
    COLLAPSED_HEIGHT, DEFAULT_FENCE_HEIGHT, DEFAULT_FENCE_TITLE, DEFAULT_FENCE_WIDTH,
};
use crate::platform::path::display_stem;

/// Generates a new record identifier.
#[must_use]
pub fn new_id() -> String { Uuid::now_v7().to_string() }

// ============================================================================
// Flag
// ============================================================================

/// How a [`Flag`] was spelled in the document it was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagEncoding {
    /// Lowercase `"true"` / `"false"`.
    Canonical,
    /// A native JSON boolean or a differently-cased string.
    Legacy,
    /// Anything else; the value reads as `false`.
    Unparseable,
}

/// A boolean persisted as the string `"true"` or `"false"`.
///
/// Reads are tolerant; writes are always canonical.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flag {
    value: bool,
    encoding: FlagEncoding,
}

impl Flag {
    #[must_use]
    pub const fn new(value: bool) -> Self { Self { value, encoding: FlagEncoding::Canonical } }

    #[must_use]
    pub const fn value(self) -> bool { self.value }

    #[must_use]
    pub const fn encoding(self) -> FlagEncoding { self.encoding }

    #[must_use]
    pub const fn is_canonical(self) -> bool { matches!(self.encoding, FlagEncoding::Canonical) }

    #[must_use]
    pub const fn as_str(self) -> &'static str { if self.value { "true" } else { "false" } }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self { Self::new(value) }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(b) => Self { value: b, encoding: FlagEncoding::Legacy },
            Value::String(s) if s == "true" || s == "false" => Self::new(s == "true"),
            Value::String(s) => match parse_bool(&s) {
                Some(b) => Self { value: b, encoding: FlagEncoding::Legacy },
                None => Self { value: false, encoding: FlagEncoding::Unparseable },
            },
            _ => Self { value: false, encoding: FlagEncoding::Unparseable },
        })
    }
}

// ============================================================================
// Items Type
// ============================================================================

/// What a fence holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ItemsType {
    /// An explicit, persisted list of shortcut items.
    #[default]
    Data,
    /// A live mirror of a folder.
    Portal,
    /// Free-form text.
    Note,
}

impl ItemsType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Portal => "Portal",
            Self::Note => "Note",
        }
    }

    /// Parses a type name case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [Self::Data, Self::Portal, Self::Note]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ItemsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for ItemsType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(Self::parse).unwrap_or_default())
    }
}

// ============================================================================
// Item Record
// ============================================================================

/// One icon inside a Data fence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemRecord {
    /// Path of the file, folder, or shortcut file this icon represents.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub filename: String,

    #[serde(default, deserialize_with = "optional_bool", skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,

    #[serde(default, deserialize_with = "optional_bool", skip_serializing_if = "Option::is_none")]
    pub is_link: Option<bool>,

    #[serde(default, deserialize_with = "optional_bool", skip_serializing_if = "Option::is_none")]
    pub is_network: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, deserialize_with = "optional_integer", skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemRecord {
    /// Creates an item with every classification flag resolved.
    #[must_use]
    pub fn new(filename: impl Into<String>, is_folder: bool, is_link: bool, is_network: bool) -> Self {
        Self {
            filename: filename.into(),
            is_folder: Some(is_folder),
            is_link: Some(is_link),
            is_network: Some(is_network),
            ..Self::default()
        }
    }

    /// Label text: the display name override, or the file name without its
    /// extension.
    #[must_use]
    pub fn label(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => display_stem(&self.filename),
        }
    }

    #[must_use]
    pub fn is_folder(&self) -> bool { self.is_folder.unwrap_or(false) }

    #[must_use]
    pub fn is_link(&self) -> bool { self.is_link.unwrap_or(false) }

    #[must_use]
    pub fn is_network(&self) -> bool { self.is_network.unwrap_or(false) }
}

/// Returns item indices in display order.
///
/// Items with a `DisplayOrder` sort by it; the rest keep their document
/// order after them.
#[must_use]
pub fn display_order(items: &[ItemRecord]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by_key(|&i| items[i].display_order.unwrap_or(i64::MAX));
    indices
}

// ============================================================================
// Items Field
// ============================================================================

/// The `Items` value of a fence.
///
/// Old Portal fences stored their folder path here instead of in `Path`;
/// migration moves it.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemsField {
    List(Vec<ItemRecord>),
    LegacyPath(String),
}

impl Default for ItemsField {
    fn default() -> Self { Self::List(Vec::new()) }
}

impl Serialize for ItemsField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(items) => items.serialize(serializer),
            Self::LegacyPath(path) => serializer.serialize_str(path),
        }
    }
}

impl<'de> Deserialize<'de> for ItemsField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::default()),
            Value::String(path) => Ok(Self::LegacyPath(path)),
            array @ Value::Array(_) => serde_json::from_value(array).map(Self::List).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("Items must be an array, found {other}"))),
        }
    }
}

// ============================================================================
// Tab Record
// ============================================================================

/// A named partition of a fence's items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TabRecord {
    #[serde(rename = "TabName", default, deserialize_with = "string_or_empty")]
    pub name: String,

    #[serde(default)]
    pub items: Vec<ItemRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

// ============================================================================
// Fence Record
// ============================================================================

/// One fence as persisted in the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FenceRecord {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub x: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub y: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub width: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub height: f64,

    #[serde(default)]
    pub items_type: ItemsType,

    #[serde(default)]
    pub items: ItemsField,

    /// Mirrored folder of a Portal fence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, deserialize_with = "optional_bool", skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rolled: Option<Flag>,

    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub unrolled_height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_launch_effect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,

    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub border_thickness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_text_color: Option<String>,

    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub title_text_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_title_text: Option<Flag>,

    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<f64>,

    #[serde(default, deserialize_with = "optional_number", skip_serializing_if = "Option::is_none")]
    pub icon_spacing: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_text_shadow: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grayscale_icons: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs_enabled: Option<Flag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabRecord>,

    #[serde(default, deserialize_with = "optional_index", skip_serializing_if = "Option::is_none")]
    pub current_tab: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_content: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FenceRecord {
    /// Creates a fully-defaulted record with a fresh id.
    #[must_use]
    pub fn new(kind: ItemsType, title: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            items_type: kind,
            is_locked: Some(Flag::new(false)),
            is_hidden: Some(Flag::new(false)),
            is_rolled: Some(Flag::new(false)),
            unrolled_height: Some(bounds.height),
            note_content: (kind == ItemsType::Note).then(String::new),
            ..Self::default()
        }
    }

    /// The record written when no document exists yet.
    #[must_use]
    pub fn default_data_fence() -> Self {
        Self::new(
            ItemsType::Data,
            DEFAULT_FENCE_TITLE,
            Rect::new(100.0, 100.0, DEFAULT_FENCE_WIDTH, DEFAULT_FENCE_HEIGHT),
        )
    }

    /// Creates a Portal fence mirroring `path`.
    #[must_use]
    pub fn new_portal(title: impl Into<String>, bounds: Rect, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            is_folder: Some(true),
            ..Self::new(ItemsType::Portal, title, bounds)
        }
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect { Rect::new(self.x, self.y, self.width, self.height) }

    #[must_use]
    pub fn is_locked(&self) -> bool { self.is_locked.is_some_and(Flag::value) }

    #[must_use]
    pub fn is_hidden(&self) -> bool { self.is_hidden.is_some_and(Flag::value) }

    #[must_use]
    pub fn is_rolled(&self) -> bool { self.is_rolled.is_some_and(Flag::value) }

    #[must_use]
    pub fn tabs_enabled(&self) -> bool { self.tabs_enabled.is_some_and(Flag::value) }

    /// Height to restore to when un-rolling.
    ///
    /// Falls back to the current height, then to the default height, when the
    /// stored value would violate the collapsed-height invariant.
    #[must_use]
    pub fn restore_height(&self) -> f64 {
        match self.unrolled_height {
            Some(h) if is_valid_unrolled_height(h) => h,
            _ => fallback_unrolled_height(self.height),
        }
    }

    #[must_use]
    pub fn custom_color(&self) -> Option<FenceColor> {
        self.custom_color.as_deref().and_then(FenceColor::parse)
    }

    #[must_use]
    pub fn custom_launch_effect(&self) -> Option<LaunchEffect> {
        self.custom_launch_effect.as_deref().and_then(LaunchEffect::parse)
    }

    /// The persisted item list (empty for a legacy path value).
    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        match &self.items {
            ItemsField::List(items) => items,
            ItemsField::LegacyPath(_) => &[],
        }
    }

    /// Mutable item list; a legacy path value is replaced by an empty list.
    pub fn items_mut(&mut self) -> &mut Vec<ItemRecord> {
        loop {
            match self.items {
                ItemsField::List(ref mut items) => return items,
                ItemsField::LegacyPath(_) => self.items = ItemsField::default(),
            }
        }
    }

    /// Index of the tab item operations act on, when tabs are in use.
    #[must_use]
    pub fn active_tab(&self) -> Option<usize> {
        if !self.tabs_enabled() || self.tabs.is_empty() {
            return None;
        }
        Some(self.current_tab.unwrap_or(0).min(self.tabs.len() - 1))
    }

    /// Items of the active tab, or the plain item list when tabs are off.
    #[must_use]
    pub fn active_items(&self) -> &[ItemRecord] {
        match self.active_tab() {
            Some(tab) => &self.tabs[tab].items,
            None => self.items(),
        }
    }

    /// Mutable counterpart of [`Self::active_items`].
    pub fn active_items_mut(&mut self) -> &mut Vec<ItemRecord> {
        match self.active_tab() {
            Some(tab) => &mut self.tabs[tab].items,
            None => self.items_mut(),
        }
    }
}

/// Whether a value may be stored as `UnrolledHeight`.
#[must_use]
pub fn is_valid_unrolled_height(height: f64) -> bool { height.is_finite() && height > COLLAPSED_HEIGHT }

/// The `UnrolledHeight` to use when none is stored: the fence height if it
/// is usable, otherwise the default.
#[must_use]
pub fn fallback_unrolled_height(height: f64) -> f64 {
    if is_valid_unrolled_height(height) { height } else { DEFAULT_FENCE_HEIGHT }
}
