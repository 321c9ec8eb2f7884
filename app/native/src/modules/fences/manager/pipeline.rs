//! Property update pipeline.
//!
//! [`FenceManager::update_property`] is the only way a field change becomes
//! durable: it resolves the record, consults the transition guard, mutates
//! the record, persists the whole store, and then applies the runtime
//! consequence to the live window.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

use super::{FenceManager, panic_message};
use crate::config::{FenceColor, LaunchEffect};
use crate::modules::fences::state::lenient::{parse_bool, value_as_f64};
use crate::modules::fences::state::{
    FenceRecord, Flag, ItemRecord, ItemsType, TabRecord, is_valid_unrolled_height,
};

const LOG: &str = crate::logging::UPDATE;

// ============================================================================
// Properties
// ============================================================================

/// A typed write to one fence field.
#[derive(Clone, Debug, PartialEq)]
pub enum FenceProperty {
    Title(String),
    X(f64),
    Y(f64),
    Width(f64),
    Height(f64),
    IsLocked(bool),
    IsHidden(bool),
    IsRolled(bool),
    UnrolledHeight(f64),
    /// `None` restores the global accent color.
    CustomColor(Option<FenceColor>),
    /// `None` restores the global launch effect.
    CustomLaunchEffect(Option<LaunchEffect>),
    BorderColor(Option<String>),
    BorderThickness(Option<f64>),
    TitleTextColor(Option<String>),
    TitleTextSize(Option<f64>),
    BoldTitleText(bool),
    IconSize(Option<f64>),
    IconSpacing(Option<f64>),
    TextColor(Option<String>),
    DisableTextShadow(bool),
    GrayscaleIcons(bool),
    /// The active item list: the current tab's items when tabs are on.
    Items(Vec<ItemRecord>),
    TabsEnabled(bool),
    Tabs(Vec<TabRecord>),
    CurrentTab(Option<usize>),
    NoteContent(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Unknown fence property: {0}")]
    UnknownField(String),

    #[error("{0} cannot be changed")]
    ReadOnly(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// What [`FenceManager::update_property`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record changed and was persisted.
    Applied,
    /// The value was already set; nothing was written.
    Unchanged,
    /// Dropped because the fence is rolling.
    Suppressed,
    NotFound,
    Rejected(String),
    /// The update panicked and was abandoned.
    Failed,
}

impl UpdateOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool { matches!(self, Self::Applied) }
}

impl FenceProperty {
    /// The document field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Title(_) => "Title",
            Self::X(_) => "X",
            Self::Y(_) => "Y",
            Self::Width(_) => "Width",
            Self::Height(_) => "Height",
            Self::IsLocked(_) => "IsLocked",
            Self::IsHidden(_) => "IsHidden",
            Self::IsRolled(_) => "IsRolled",
            Self::UnrolledHeight(_) => "UnrolledHeight",
            Self::CustomColor(_) => "CustomColor",
            Self::CustomLaunchEffect(_) => "CustomLaunchEffect",
            Self::BorderColor(_) => "BorderColor",
            Self::BorderThickness(_) => "BorderThickness",
            Self::TitleTextColor(_) => "TitleTextColor",
            Self::TitleTextSize(_) => "TitleTextSize",
            Self::BoldTitleText(_) => "BoldTitleText",
            Self::IconSize(_) => "IconSize",
            Self::IconSpacing(_) => "IconSpacing",
            Self::TextColor(_) => "TextColor",
            Self::DisableTextShadow(_) => "DisableTextShadow",
            Self::GrayscaleIcons(_) => "GrayscaleIcons",
            Self::Items(_) => "Items",
            Self::TabsEnabled(_) => "TabsEnabled",
            Self::Tabs(_) => "Tabs",
            Self::CurrentTab(_) => "CurrentTab",
            Self::NoteContent(_) => "NoteContent",
        }
    }

    /// Fields the roll transition writes itself; the guard lets them through.
    #[must_use]
    pub const fn is_transition_owned(&self) -> bool { matches!(self, Self::IsRolled(_) | Self::UnrolledHeight(_)) }

    /// Decodes a field name and a JSON value.
    ///
    /// Values are read as leniently as the document: numbers may be numeric
    /// strings and flags may be `"true"`/`"false"`.
    pub fn from_json(name: &str, value: Value) -> Result<Self, PropertyError> {
        let invalid = |reason: &str| PropertyError::InvalidValue { field: name.to_string(), reason: reason.to_string() };

        let number = |value: &Value| value_as_f64(value).ok_or_else(|| invalid("expected a number"));
        let optional_number = |value: &Value| match value {
            Value::Null => Ok(None),
            other => number(other).map(Some),
        };
        let flag = |value: &Value| match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => parse_bool(s).ok_or_else(|| invalid("expected true or false")),
            _ => Err(invalid("expected true or false")),
        };
        let text = |value: Value| match value {
            Value::String(s) => Ok(s),
            _ => Err(invalid("expected a string")),
        };
        let optional_text = |value: Value| match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            _ => Err(invalid("expected a string or null")),
        };

        let property = match name {
            "Title" => Self::Title(text(value)?),
            "X" => Self::X(number(&value)?),
            "Y" => Self::Y(number(&value)?),
            "Width" => Self::Width(number(&value)?),
            "Height" => Self::Height(number(&value)?),
            "IsLocked" => Self::IsLocked(flag(&value)?),
            "IsHidden" => Self::IsHidden(flag(&value)?),
            "IsRolled" => Self::IsRolled(flag(&value)?),
            "UnrolledHeight" => Self::UnrolledHeight(number(&value)?),
            "CustomColor" => Self::CustomColor(match optional_text(value)? {
                None => None,
                Some(s) => Some(FenceColor::parse(&s).ok_or_else(|| invalid("not a known color"))?),
            }),
            "CustomLaunchEffect" => Self::CustomLaunchEffect(match optional_text(value)? {
                None => None,
                Some(s) => Some(LaunchEffect::parse(&s).ok_or_else(|| invalid("not a known launch effect"))?),
            }),
            "BorderColor" => Self::BorderColor(optional_text(value)?),
            "BorderThickness" => Self::BorderThickness(optional_number(&value)?),
            "TitleTextColor" => Self::TitleTextColor(optional_text(value)?),
            "TitleTextSize" => Self::TitleTextSize(optional_number(&value)?),
            "BoldTitleText" => Self::BoldTitleText(flag(&value)?),
            "IconSize" => Self::IconSize(optional_number(&value)?),
            "IconSpacing" => Self::IconSpacing(optional_number(&value)?),
            "TextColor" => Self::TextColor(optional_text(value)?),
            "DisableTextShadow" => Self::DisableTextShadow(flag(&value)?),
            "GrayscaleIcons" => Self::GrayscaleIcons(flag(&value)?),
            "Items" => Self::Items(serde_json::from_value(value).map_err(|err| invalid(&err.to_string()))?),
            "TabsEnabled" => Self::TabsEnabled(flag(&value)?),
            "Tabs" => Self::Tabs(serde_json::from_value(value).map_err(|err| invalid(&err.to_string()))?),
            "CurrentTab" => Self::CurrentTab(match value {
                Value::Null => None,
                other => Some(
                    other
                        .as_u64()
                        .and_then(|i| usize::try_from(i).ok())
                        .ok_or_else(|| invalid("expected a tab index"))?,
                ),
            }),
            "NoteContent" => Self::NoteContent(text(value)?),
            "Id" | "ItemsType" | "Path" | "IsFolder" => return Err(PropertyError::ReadOnly(name.to_string())),
            _ => return Err(PropertyError::UnknownField(name.to_string())),
        };
        Ok(property)
    }

    /// Checks the value against the record it is about to be written to.
    fn validate(&self, record: &FenceRecord) -> Result<(), String> {
        let kind = record.items_type;
        match self {
            Self::X(v) | Self::Y(v) if !v.is_finite() => Err("position must be finite".to_string()),
            Self::Width(v) | Self::Height(v) if !v.is_finite() || *v <= 0.0 => {
                Err("size must be positive".to_string())
            }
            Self::UnrolledHeight(v) if !is_valid_unrolled_height(*v) => {
                Err(format!("{v} is not above the collapsed height"))
            }
            Self::UnrolledHeight(_) if record.is_rolled() => {
                Err("cannot change the unrolled height while rolled".to_string())
            }
            Self::BorderThickness(Some(v))
            | Self::TitleTextSize(Some(v))
            | Self::IconSize(Some(v))
            | Self::IconSpacing(Some(v))
                if !v.is_finite() || *v < 0.0 =>
            {
                Err("must be a non-negative number".to_string())
            }
            Self::Items(_) | Self::Tabs(_) | Self::TabsEnabled(_) | Self::CurrentTab(_)
                if kind != ItemsType::Data =>
            {
                Err(format!("{kind} fences have no item list"))
            }
            Self::CurrentTab(Some(i)) if *i >= record.tabs.len() => Err(format!("no tab at index {i}")),
            Self::NoteContent(_) if kind != ItemsType::Note => Err(format!("{kind} fences have no note")),
            _ => Ok(()),
        }
    }

    /// Writes the value into `record`. Returns whether anything changed.
    fn apply(self, record: &mut FenceRecord) -> bool {
        match self {
            Self::Title(v) => set(&mut record.title, v),
            Self::X(v) => set_number(&mut record.x, v),
            Self::Y(v) => set_number(&mut record.y, v),
            Self::Width(v) => set_number(&mut record.width, v),
            Self::Height(v) => set_number(&mut record.height, v),
            Self::IsLocked(v) => set(&mut record.is_locked, Some(Flag::new(v))),
            Self::IsHidden(v) => set(&mut record.is_hidden, Some(Flag::new(v))),
            Self::IsRolled(v) => set(&mut record.is_rolled, Some(Flag::new(v))),
            Self::UnrolledHeight(v) => set(&mut record.unrolled_height, Some(v)),
            Self::CustomColor(v) => set(&mut record.custom_color, v.map(|c| c.as_str().to_string())),
            Self::CustomLaunchEffect(v) => {
                set(&mut record.custom_launch_effect, v.map(|e| e.as_str().to_string()))
            }
            Self::BorderColor(v) => set(&mut record.border_color, v),
            Self::BorderThickness(v) => set(&mut record.border_thickness, v),
            Self::TitleTextColor(v) => set(&mut record.title_text_color, v),
            Self::TitleTextSize(v) => set(&mut record.title_text_size, v),
            Self::BoldTitleText(v) => set(&mut record.bold_title_text, Some(Flag::new(v))),
            Self::IconSize(v) => set(&mut record.icon_size, v),
            Self::IconSpacing(v) => set(&mut record.icon_spacing, v),
            Self::TextColor(v) => set(&mut record.text_color, v),
            Self::DisableTextShadow(v) => set(&mut record.disable_text_shadow, Some(Flag::new(v))),
            Self::GrayscaleIcons(v) => set(&mut record.grayscale_icons, Some(Flag::new(v))),
            Self::Items(v) => set(record.active_items_mut(), v),
            Self::TabsEnabled(v) => set(&mut record.tabs_enabled, Some(Flag::new(v))),
            Self::Tabs(v) => set(&mut record.tabs, v),
            Self::CurrentTab(v) => set(&mut record.current_tab, v),
            Self::NoteContent(v) => set(&mut record.note_content, Some(v)),
        }
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn set_number(slot: &mut f64, value: f64) -> bool {
    if (*slot - value).abs() < f64::EPSILON {
        return false;
    }
    *slot = value;
    true
}

// ============================================================================
// Pipeline
// ============================================================================

impl FenceManager {
    /// Writes one field of one fence and applies its consequence.
    ///
    /// Never panics into the caller: failures are logged and reported
    /// through the returned outcome.
    pub fn update_property(&mut self, id: &str, property: FenceProperty) -> UpdateOutcome {
        let field = property.name();
        match catch_unwind(AssertUnwindSafe(|| self.apply_property(id, property))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                tracing::error!(
                    target: LOG,
                    fence_id = %id,
                    field,
                    panic = %panic_message(panic.as_ref()),
                    "property update panicked, operation abandoned"
                );
                UpdateOutcome::Failed
            }
        }
    }

    /// [`Self::update_property`] addressed by document field name.
    pub fn update_property_by_name(
        &mut self,
        id: &str,
        name: &str,
        value: Value,
    ) -> Result<UpdateOutcome, PropertyError> {
        let property = FenceProperty::from_json(name, value)?;
        Ok(self.update_property(id, property))
    }

    fn apply_property(&mut self, id: &str, property: FenceProperty) -> UpdateOutcome {
        let field = property.name();
        let window_height = self.windows.get(id).map(|window| window.bounds().height);

        let Some(record) = self.store.find_by_id_mut(id) else {
            tracing::warn!(target: LOG, fence_id = %id, field, "update for unknown fence ignored");
            return UpdateOutcome::NotFound;
        };

        if self.guard.is_active(id) && !property.is_transition_owned() {
            tracing::debug!(target: LOG, fence_id = %id, field, "update dropped while fence is rolling");
            return UpdateOutcome::Suppressed;
        }

        if let Err(reason) = property.validate(record) {
            tracing::warn!(target: LOG, fence_id = %id, field, reason = %reason, "update rejected");
            return UpdateOutcome::Rejected(reason);
        }

        if let FenceProperty::IsRolled(rolled) = property
            && record.is_rolled() != rolled
            && let Some(window) = self.windows.get(id)
            && !window.can_roll(rolled)
        {
            let reason = format!("window cannot roll while {}", window.roll_state());
            tracing::warn!(target: LOG, fence_id = %id, field, reason = %reason, "update rejected");
            return UpdateOutcome::Rejected(reason);
        }

        // Rolling up remembers the height to come back to. A fence caught
        // mid-expansion keeps the height it is expanding towards.
        if matches!(property, FenceProperty::IsRolled(true))
            && !record.is_rolled()
            && !self.guard.is_active(id)
        {
            let current = window_height.unwrap_or(record.height);
            if is_valid_unrolled_height(current) {
                record.unrolled_height = Some(current);
            }
        }

        if !property.clone().apply(record) {
            tracing::trace!(target: LOG, fence_id = %id, field, "value unchanged");
            return UpdateOutcome::Unchanged;
        }

        let record = record.clone();
        self.persist();
        self.sync_hidden(&record, &property);
        self.apply_consequence(&record, &property);

        tracing::debug!(target: LOG, fence_id = %id, field, "property updated");
        UpdateOutcome::Applied
    }

    fn sync_hidden(&mut self, record: &FenceRecord, property: &FenceProperty) {
        match property {
            FenceProperty::IsHidden(true) => self.hidden.add(&record.id, &record.title),
            FenceProperty::IsHidden(false) => {
                self.hidden.remove(&record.id);
            }
            FenceProperty::Title(_) if record.is_hidden() => self.hidden.add(&record.id, &record.title),
            _ => {}
        }
    }

    fn apply_consequence(&mut self, record: &FenceRecord, property: &FenceProperty) {
        let Some(window) = self.windows.get_mut(&record.id) else {
            tracing::debug!(
                target: LOG,
                fence_id = %record.id,
                field = property.name(),
                "no live window for updated fence"
            );
            return;
        };

        match property {
            FenceProperty::Title(title) => window.set_title(title),
            FenceProperty::X(_) | FenceProperty::Y(_) => window.set_position(record.x, record.y),
            FenceProperty::Width(_) | FenceProperty::Height(_) => {
                let height = if record.is_rolled() { window.bounds().height } else { record.height };
                window.set_size(record.width, height);
            }
            FenceProperty::IsLocked(locked) => window.set_locked(*locked),
            FenceProperty::IsHidden(hidden) => window.set_visible(!hidden),
            FenceProperty::IsRolled(rolled) => {
                let now = Instant::now();
                let duration = self.config.behavior.roll_duration();
                let started = if *rolled {
                    window.begin_collapse(now, duration)
                } else {
                    window.begin_expand(record.restore_height(), now, duration)
                };
                match started {
                    Ok(()) => {
                        self.guard.begin(&record.id);
                    }
                    Err(err) => {
                        tracing::warn!(target: LOG, fence_id = %record.id, error = %err, "roll animation not started");
                    }
                }
            }
            FenceProperty::UnrolledHeight(_) => {}
            FenceProperty::CustomColor(_)
            | FenceProperty::CustomLaunchEffect(_)
            | FenceProperty::BorderColor(_)
            | FenceProperty::BorderThickness(_)
            | FenceProperty::TitleTextColor(_)
            | FenceProperty::TitleTextSize(_)
            | FenceProperty::BoldTitleText(_)
            | FenceProperty::IconSize(_)
            | FenceProperty::IconSpacing(_)
            | FenceProperty::TextColor(_)
            | FenceProperty::DisableTextShadow(_)
            | FenceProperty::GrayscaleIcons(_) => window.restyle(record, &self.config.appearance),
            FenceProperty::Items(_)
            | FenceProperty::TabsEnabled(_)
            | FenceProperty::Tabs(_)
            | FenceProperty::CurrentTab(_) => {
                window.refresh_items(record);
                window.rebuild_menu(record);
                self.sync_poll_targets(&record.id);
            }
            FenceProperty::NoteContent(text) => window.set_note_text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::constants::COLLAPSED_HEIGHT;
    use crate::modules::fences::animation::RollState;
    use crate::modules::fences::manager::testing::Harness;
    use crate::modules::fences::state::read_document;

    #[test]
    fn test_from_json_parses_lenient_values() {
        assert_eq!(FenceProperty::from_json("X", json!("12.5")).unwrap(), FenceProperty::X(12.5));
        assert_eq!(FenceProperty::from_json("IsLocked", json!("TRUE")).unwrap(), FenceProperty::IsLocked(true));
        assert_eq!(
            FenceProperty::from_json("CustomColor", json!("purple")).unwrap(),
            FenceProperty::CustomColor(Some(FenceColor::Purple))
        );
        assert_eq!(FenceProperty::from_json("CustomColor", json!(null)).unwrap(), FenceProperty::CustomColor(None));
        assert_eq!(FenceProperty::from_json("CurrentTab", json!(1)).unwrap(), FenceProperty::CurrentTab(Some(1)));
    }

    #[test]
    fn test_from_json_errors() {
        assert_eq!(
            FenceProperty::from_json("Colour", json!("Red")),
            Err(PropertyError::UnknownField("Colour".to_string()))
        );
        assert_eq!(FenceProperty::from_json("Id", json!("x")), Err(PropertyError::ReadOnly("Id".to_string())));
        assert!(matches!(
            FenceProperty::from_json("CustomColor", json!("Chartreuse")),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(FenceProperty::from_json("Width", json!(true)), Err(PropertyError::InvalidValue { .. })));
    }

    #[test]
    fn test_update_persists_and_applies() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        assert_eq!(h.manager.update_property(&id, FenceProperty::Title("Work".to_string())), UpdateOutcome::Applied);
        assert_eq!(h.host.surface(&id).unwrap().title, "Work");

        let persisted = read_document(h.manager.store.path()).unwrap();
        assert_eq!(persisted[0].title, "Work");
        assert_eq!(
            h.manager.update_property(&id, FenceProperty::Title("Work".to_string())),
            UpdateOutcome::Unchanged
        );
    }

    #[test]
    fn test_unknown_fence_is_not_found() {
        let mut h = Harness::loaded();
        assert_eq!(h.manager.update_property("missing", FenceProperty::X(1.0)), UpdateOutcome::NotFound);
    }

    #[test]
    fn test_guard_blocks_all_but_roll_fields() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.guard.begin(&id);

        assert_eq!(h.manager.update_property(&id, FenceProperty::Width(500.0)), UpdateOutcome::Suppressed);
        assert_eq!(
            h.manager.update_property(&id, FenceProperty::CustomColor(Some(FenceColor::Red))),
            UpdateOutcome::Suppressed
        );
        assert_eq!(h.manager.update_property(&id, FenceProperty::UnrolledHeight(300.0)), UpdateOutcome::Applied);

        let record = h.manager.record(&id).unwrap();
        assert!((record.width - 230.0).abs() < f64::EPSILON);
        assert!(record.custom_color.is_none());
    }

    #[test]
    fn test_unrolled_height_validation() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        assert!(matches!(
            h.manager.update_property(&id, FenceProperty::UnrolledHeight(COLLAPSED_HEIGHT)),
            UpdateOutcome::Rejected(_)
        ));

        h.manager.update_property(&id, FenceProperty::IsRolled(true));
        h.manager.finish_animations();
        assert!(matches!(
            h.manager.update_property(&id, FenceProperty::UnrolledHeight(400.0)),
            UpdateOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_unroll_mid_collapse_reverses_window() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::Height(300.0));

        assert_eq!(h.manager.update_property(&id, FenceProperty::IsRolled(true)), UpdateOutcome::Applied);
        assert_eq!(h.manager.update_property(&id, FenceProperty::IsRolled(false)), UpdateOutcome::Applied);
        h.manager.advance_animations(Instant::now() + Duration::from_secs(5));

        let window = h.manager.window(&id).unwrap();
        assert_eq!(window.roll_state(), RollState::Expanded);
        assert!(!h.manager.record(&id).unwrap().is_rolled());
        assert!(!h.manager.is_transitioning(&id));

        let surface = h.host.surface(&id).unwrap();
        assert!(surface.content_visible);
        assert!((surface.bounds.height - 300.0).abs() < f64::EPSILON);
        assert!(!read_document(h.manager.store.path()).unwrap()[0].is_rolled());
    }

    #[test]
    fn test_roll_mid_expansion_keeps_restore_height() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::Height(300.0));
        h.manager.update_property(&id, FenceProperty::IsRolled(true));
        h.manager.finish_animations();

        h.manager.update_property(&id, FenceProperty::IsRolled(false));
        h.manager.advance_animations(Instant::now() + Duration::from_millis(150));
        assert!(h.manager.is_transitioning(&id));
        assert_eq!(h.manager.update_property(&id, FenceProperty::IsRolled(true)), UpdateOutcome::Applied);
        assert_eq!(h.manager.record(&id).unwrap().unrolled_height, Some(300.0));

        h.manager.finish_animations();
        assert_eq!(h.manager.window(&id).unwrap().roll_state(), RollState::Collapsed);
        assert!(!h.host.surface(&id).unwrap().content_visible);

        h.manager.update_property(&id, FenceProperty::IsRolled(false));
        h.manager.finish_animations();
        assert!((h.host.surface(&id).unwrap().bounds.height - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roll_rejected_when_window_disagrees() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::IsRolled(true));
        h.manager.finish_animations();

        // Flip the record behind the window's back.
        h.manager.store.find_by_id_mut(&id).unwrap().is_rolled = Some(Flag::new(false));
        let before = std::fs::read_to_string(h.manager.store.path()).unwrap();

        assert!(matches!(
            h.manager.update_property(&id, FenceProperty::IsRolled(true)),
            UpdateOutcome::Rejected(_)
        ));
        assert!(!h.manager.record(&id).unwrap().is_rolled());
        assert_eq!(std::fs::read_to_string(h.manager.store.path()).unwrap(), before);
    }

    #[test]
    fn test_hidden_updates_registry_and_visibility() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.update_property(&id, FenceProperty::IsHidden(true));
        assert!(!h.host.surface(&id).unwrap().visible);
        assert_eq!(h.manager.hidden_fences().len(), 1);

        h.manager.update_property(&id, FenceProperty::Title("Renamed".to_string()));
        assert_eq!(h.manager.hidden_fences()[0].title, "Renamed");

        h.manager.update_property(&id, FenceProperty::IsHidden(false));
        assert!(h.host.surface(&id).unwrap().visible);
        assert!(h.manager.hidden_fences().is_empty());
    }

    #[test]
    fn test_color_restyles_window() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.update_property(&id, FenceProperty::CustomColor(Some(FenceColor::Green)));
        let menu = h.host.surface(&id).unwrap().menu.unwrap();
        assert_eq!(menu.checked_color().map(|e| e.label.as_str()), Some("Green"));
    }

    #[test]
    fn test_kind_specific_fields_are_rejected() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        assert!(matches!(
            h.manager.update_property(&id, FenceProperty::NoteContent("hi".to_string())),
            UpdateOutcome::Rejected(_)
        ));
        assert!(matches!(
            h.manager.update_property(&id, FenceProperty::CurrentTab(Some(3))),
            UpdateOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_update_by_name() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        assert_eq!(h.manager.update_property_by_name(&id, "IsLocked", json!(true)), Ok(UpdateOutcome::Applied));
        assert!(h.manager.record(&id).unwrap().is_locked());
        assert!(h.host.surface(&id).unwrap().locked);
        assert!(h.manager.update_property_by_name(&id, "Nope", json!(1)).is_err());
    }
}
