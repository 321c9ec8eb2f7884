//! Resolved visuals for a fence: chrome styling and item icons.

use serde::Serialize;

use crate::config::{AppearanceConfig, FenceColor, LaunchEffect};
use crate::modules::fences::portal::PortalEntry;
use crate::modules::fences::state::{FenceRecord, ItemRecord};
use crate::platform::path::display_stem;

const DEFAULT_BORDER_THICKNESS: f64 = 1.0;
const DEFAULT_TITLE_TEXT_SIZE: f64 = 12.0;
const DEFAULT_ICON_SIZE: f64 = 32.0;
const DEFAULT_ICON_SPACING: f64 = 5.0;

/// Window chrome after applying per-fence overrides over global defaults.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeStyle {
    pub color: FenceColor,
    pub tint_percent: u8,
    pub border_color: Option<String>,
    pub border_thickness: f64,
    pub title_text_color: Option<String>,
    pub title_text_size: f64,
    pub bold_title: bool,
    pub icon_size: f64,
    pub icon_spacing: f64,
    pub text_color: Option<String>,
    pub text_shadow: bool,
    pub grayscale_icons: bool,
    pub launch_effect: LaunchEffect,
}

impl ChromeStyle {
    #[must_use]
    pub fn resolve(record: &FenceRecord, appearance: &AppearanceConfig) -> Self {
        Self {
            color: record.custom_color().unwrap_or(appearance.accent_color),
            tint_percent: appearance.tint_percent(),
            border_color: non_empty(record.border_color.as_deref()),
            border_thickness: record
                .border_thickness
                .filter(|t| t.is_finite() && *t >= 0.0)
                .unwrap_or(DEFAULT_BORDER_THICKNESS),
            title_text_color: non_empty(record.title_text_color.as_deref()),
            title_text_size: positive_or(record.title_text_size, DEFAULT_TITLE_TEXT_SIZE),
            bold_title: record.bold_title_text.is_some_and(|f| f.value()),
            icon_size: positive_or(record.icon_size, DEFAULT_ICON_SIZE),
            icon_spacing: record
                .icon_spacing
                .filter(|s| s.is_finite() && *s >= 0.0)
                .unwrap_or(DEFAULT_ICON_SPACING),
            text_color: non_empty(record.text_color.as_deref()),
            text_shadow: !record.disable_text_shadow.is_some_and(|f| f.value()),
            grayscale_icons: record.grayscale_icons.is_some_and(|f| f.value()),
            launch_effect: record.custom_launch_effect().unwrap_or(appearance.launch_effect),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// One icon as shown in a fence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVisual {
    pub label: String,
    pub filename: String,
    pub is_folder: bool,
    pub is_link: bool,
    pub is_network: bool,
    /// The target is missing.
    pub broken: bool,
}

impl ItemVisual {
    #[must_use]
    pub fn from_item(item: &ItemRecord) -> Self {
        Self {
            label: item.label(),
            filename: item.filename.clone(),
            is_folder: item.is_folder(),
            is_link: item.is_link(),
            is_network: item.is_network(),
            broken: false,
        }
    }

    #[must_use]
    pub fn from_portal_entry(entry: &PortalEntry) -> Self {
        Self {
            label: if entry.is_dir { entry.name.clone() } else { display_stem(&entry.name) },
            filename: entry.path.to_string_lossy().into_owned(),
            is_folder: entry.is_dir,
            is_link: false,
            is_network: false,
            broken: false,
        }
    }
}
