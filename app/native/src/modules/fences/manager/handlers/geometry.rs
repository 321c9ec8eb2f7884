//! Drag, snap, and resize handlers.

use crate::constants::{COLLAPSED_HEIGHT, MIN_FENCE_WIDTH, UNROLLED_HEIGHT_MARGIN};
use crate::modules::fences::bounds::{monitor_for_rect, snap_position};
use crate::modules::fences::manager::{FenceManager, FenceProperty};
use crate::modules::fences::state::Rect;

const LOG: &str = crate::logging::UI;

/// Moves a fence with the pointer. Locked or rolling fences stay put.
pub fn on_dragged(manager: &mut FenceManager, id: &str, x: f64, y: f64) {
    if manager.record(id).is_some_and(|record| record.is_locked()) {
        tracing::trace!(target: LOG, fence_id = %id, "drag ignored, fence is locked");
        return;
    }
    if manager.is_transitioning(id) {
        tracing::trace!(target: LOG, fence_id = %id, "drag ignored while rolling");
        return;
    }

    if let Some(window) = manager.windows.get_mut(id) {
        window.set_position(x, y);
    }
    manager.update_property(id, FenceProperty::X(x));
    manager.update_property(id, FenceProperty::Y(y));
}

/// Snaps a released fence to work-area edges and neighbouring fences.
pub fn on_drag_finished(manager: &mut FenceManager, id: &str) {
    let behavior = &manager.config.behavior;
    if !behavior.snap_enabled || manager.record(id).is_none_or(|record| record.is_locked()) {
        return;
    }
    let threshold = behavior.snap_threshold;

    let Some(bounds) = manager.windows.get(id).map(|window| window.bounds()) else {
        return;
    };
    let monitors = manager.host.monitors();
    let Some(work_area) = monitor_for_rect(&bounds, &monitors).map(|monitor| monitor.work_area_dip()) else {
        return;
    };

    let others: Vec<Rect> = manager
        .store
        .records()
        .iter()
        .filter(|record| record.id != id && !record.is_hidden())
        .filter_map(|record| manager.windows.get(&record.id))
        .map(|window| window.bounds())
        .collect();

    let (x, y) = snap_position(bounds, work_area, &others, threshold);
    if (x - bounds.x).abs() < f64::EPSILON && (y - bounds.y).abs() < f64::EPSILON {
        return;
    }

    tracing::debug!(target: LOG, fence_id = %id, x, y, "fence snapped");
    if let Some(window) = manager.windows.get_mut(id) {
        window.set_position(x, y);
    }
    manager.update_property(id, FenceProperty::X(x));
    manager.update_property(id, FenceProperty::Y(y));
}

/// Records a user resize.
///
/// Dropped entirely while the fence is rolling: the animation drives the
/// height then. A rolled fence keeps its expanded height on record.
pub fn on_size_changed(manager: &mut FenceManager, id: &str, width: f64, height: f64) {
    if manager.is_transitioning(id) {
        tracing::trace!(target: LOG, fence_id = %id, "resize ignored while rolling");
        return;
    }
    let Some(rolled) = manager.record(id).map(|record| record.is_rolled()) else {
        return;
    };

    let clamped = width.max(MIN_FENCE_WIDTH);
    if (clamped - width).abs() > f64::EPSILON
        && let Some(window) = manager.windows.get_mut(id)
    {
        window.set_size(clamped, height);
    }

    manager.update_property(id, FenceProperty::Width(clamped));
    if rolled {
        return;
    }
    manager.update_property(id, FenceProperty::Height(height));
    if height > COLLAPSED_HEIGHT + UNROLLED_HEIGHT_MARGIN {
        manager.update_property(id, FenceProperty::UnrolledHeight(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fences::manager::FenceEvent;
    use crate::modules::fences::manager::testing::Harness;
    use crate::modules::fences::state::ItemsType;

    #[test]
    fn test_drag_moves_unlocked_fence() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.handle_event(&id, FenceEvent::Dragged { x: 400.0, y: 300.0 });
        let record = h.manager.record(&id).unwrap();
        assert!((record.x - 400.0).abs() < f64::EPSILON);
        assert!((record.y - 300.0).abs() < f64::EPSILON);

        h.manager.handle_event(&id, FenceEvent::LockClicked);
        h.manager.handle_event(&id, FenceEvent::Dragged { x: 10.0, y: 10.0 });
        assert!((h.manager.record(&id).unwrap().x - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_finished_snaps_to_edges_and_neighbours() {
        let mut h = Harness::loaded();
        let first = h.first_id();
        h.manager.handle_event(&first, FenceEvent::Dragged { x: 6.0, y: 300.0 });
        h.manager.handle_event(&first, FenceEvent::DragFinished);
        assert!(h.manager.record(&first).unwrap().x.abs() < f64::EPSILON);

        let second = h.manager.create_fence(ItemsType::Data, 700.0, 700.0).unwrap();
        h.manager.handle_event(&second, FenceEvent::Dragged { x: 236.0, y: 305.0 });
        h.manager.handle_event(&second, FenceEvent::DragFinished);
        let record = h.manager.record(&second).unwrap();
        assert!((record.x - 230.0).abs() < f64::EPSILON);
        assert!((record.y - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_updates_unrolled_height() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.handle_event(&id, FenceEvent::SizeChanged { width: 40.0, height: 300.0 });
        let record = h.manager.record(&id).unwrap();
        assert!((record.width - MIN_FENCE_WIDTH).abs() < f64::EPSILON);
        assert!((record.height - 300.0).abs() < f64::EPSILON);
        assert_eq!(record.unrolled_height, Some(300.0));
        assert!((h.host.surface(&id).unwrap().bounds.width - MIN_FENCE_WIDTH).abs() < f64::EPSILON);

        // Close to the collapsed height the remembered height is kept.
        h.manager.handle_event(&id, FenceEvent::SizeChanged { width: 200.0, height: 30.0 });
        assert_eq!(h.manager.record(&id).unwrap().unrolled_height, Some(300.0));
    }

    #[test]
    fn test_resize_dropped_while_rolling() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::IsRolled(true));

        h.manager.handle_event(&id, FenceEvent::SizeChanged { width: 500.0, height: 60.0 });
        let record = h.manager.record(&id).unwrap();
        assert!((record.width - 230.0).abs() < f64::EPSILON);
        assert!((record.height - 130.0).abs() < f64::EPSILON);

        h.manager.finish_animations();
        h.manager.handle_event(&id, FenceEvent::SizeChanged { width: 500.0, height: 26.0 });
        let record = h.manager.record(&id).unwrap();
        assert!((record.width - 500.0).abs() < f64::EPSILON);
        assert!((record.height - 130.0).abs() < f64::EPSILON);
    }
}
