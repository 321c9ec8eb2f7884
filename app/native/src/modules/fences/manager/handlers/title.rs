//! Title bar handlers: roll toggle and rename.

use crate::modules::fences::manager::{FenceManager, FenceProperty, UpdateOutcome};

const LOG: &str = crate::logging::UI;

/// A click on the title toggles roll only with the roll modifier held.
pub fn on_title_clicked(manager: &mut FenceManager, id: &str, modifier: bool) {
    if modifier {
        toggle_roll(manager, id);
    }
}

/// Rolls an expanded fence up or unrolls a rolled one.
///
/// Ignored while the fence is already rolling.
pub fn toggle_roll(manager: &mut FenceManager, id: &str) -> UpdateOutcome {
    if manager.is_transitioning(id) {
        tracing::debug!(target: LOG, fence_id = %id, "roll toggle ignored while rolling");
        return UpdateOutcome::Suppressed;
    }
    let Some(rolled) = manager.record(id).map(|record| record.is_rolled()) else {
        return UpdateOutcome::NotFound;
    };
    manager.update_property(id, FenceProperty::IsRolled(!rolled))
}

pub fn on_title_double_clicked(manager: &mut FenceManager, id: &str) {
    if let Some(window) = manager.windows.get_mut(id) {
        window.begin_rename();
    }
}

/// Commits a rename. A blank title is refused and the old one shown again.
pub fn on_title_edit_committed(manager: &mut FenceManager, id: &str, title: &str) {
    let Some(window) = manager.windows.get_mut(id) else {
        return;
    };
    if !window.end_rename() {
        return;
    }

    let title = title.trim();
    if title.is_empty() {
        tracing::debug!(target: LOG, fence_id = %id, "blank title refused");
        restore_title(manager, id);
        return;
    }
    manager.update_property(id, FenceProperty::Title(title.to_string()));
}

pub fn on_title_edit_cancelled(manager: &mut FenceManager, id: &str) {
    if manager.windows.get_mut(id).is_some_and(|window| window.end_rename()) {
        restore_title(manager, id);
    }
}

fn restore_title(manager: &mut FenceManager, id: &str) {
    if let (Some(record), Some(window)) = (manager.store.find_by_id(id), manager.windows.get_mut(id)) {
        window.set_title(&record.title);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::modules::fences::animation::RollState;
    use crate::modules::fences::manager::FenceEvent;
    use crate::modules::fences::manager::testing::Harness;

    #[test]
    fn test_modifier_click_toggles_roll() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.handle_event(&id, FenceEvent::TitleClicked { modifier: false });
        assert!(!h.manager.record(&id).unwrap().is_rolled());

        h.manager.handle_event(&id, FenceEvent::TitleClicked { modifier: true });
        assert!(h.manager.record(&id).unwrap().is_rolled());
        assert!(h.manager.is_transitioning(&id));

        // A second toggle mid-animation is dropped.
        h.manager.handle_event(&id, FenceEvent::TitleClicked { modifier: true });
        assert!(h.manager.record(&id).unwrap().is_rolled());

        h.manager.advance_animations(Instant::now() + Duration::from_secs(5));
        h.manager.handle_event(&id, FenceEvent::TitleClicked { modifier: true });
        assert!(!h.manager.record(&id).unwrap().is_rolled());
        h.manager.finish_animations();
        assert_eq!(h.manager.window(&id).unwrap().roll_state(), RollState::Expanded);
    }

    #[test]
    fn test_rename_commit_and_cancel() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.handle_event(&id, FenceEvent::TitleDoubleClicked);
        assert!(h.host.surface(&id).unwrap().editing_title);
        h.manager.handle_event(&id, FenceEvent::TitleEditCommitted("  Games ".to_string()));
        assert_eq!(h.manager.record(&id).unwrap().title, "Games");
        assert!(!h.host.surface(&id).unwrap().editing_title);

        h.manager.handle_event(&id, FenceEvent::TitleDoubleClicked);
        h.manager.handle_event(&id, FenceEvent::TitleEditCommitted("   ".to_string()));
        assert_eq!(h.manager.record(&id).unwrap().title, "Games");
        assert_eq!(h.host.surface(&id).unwrap().title, "Games");

        h.manager.handle_event(&id, FenceEvent::TitleEditCancelled);
        assert_eq!(h.manager.record(&id).unwrap().title, "Games");
    }
}
