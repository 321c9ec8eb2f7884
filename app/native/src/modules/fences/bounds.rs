//! Position and bounds reconciliation.
//!
//! Fence bounds live in device-independent units; monitors report device
//! pixels. Everything here converts the monitor side to DIP first.

use super::state::{Monitor, Rect};

/// Finds the monitor a fence is on.
///
/// The monitor containing the rectangle's center wins; otherwise the one with
/// the largest overlap; otherwise the primary monitor.
#[must_use]
pub fn monitor_for_rect<'a>(rect: &Rect, monitors: &'a [Monitor]) -> Option<&'a Monitor> {
    let center_x = rect.width.mul_add(0.5, rect.x);
    let center_y = rect.height.mul_add(0.5, rect.y);

    if let Some(monitor) = monitors.iter().find(|m| m.bounds_dip().contains_point(center_x, center_y)) {
        return Some(monitor);
    }

    let best_overlap = monitors
        .iter()
        .map(|m| (m, m.bounds_dip().intersection_area(rect)))
        .filter(|(_, area)| *area > 0.0)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(m, _)| m);

    best_overlap.or_else(|| monitors.iter().find(|m| m.is_primary)).or_else(|| monitors.first())
}

/// Fits `rect` into `work_area`.
///
/// The rectangle is shrunk only if it is larger than the work area, then
/// shifted so all edges are inside. It never grows.
#[must_use]
pub fn clamp_to_work_area(rect: Rect, work_area: Rect) -> Rect {
    let width = rect.width.min(work_area.width);
    let height = rect.height.min(work_area.height);

    let x = rect.x.max(work_area.x).min(work_area.right() - width);
    let y = rect.y.max(work_area.y).min(work_area.bottom() - height);

    Rect::new(x, y, width, height)
}

/// Clamps `rect` into the work area of the monitor it is on.
///
/// Without any monitor the rectangle is returned unchanged.
#[must_use]
pub fn reconcile(rect: Rect, monitors: &[Monitor]) -> Rect {
    match monitor_for_rect(&rect, monitors) {
        Some(monitor) => clamp_to_work_area(rect, monitor.work_area_dip()),
        None => rect,
    }
}

/// Snaps a dragged fence's position to work-area edges and other fences.
///
/// Each axis snaps independently to the closest candidate within
/// `threshold`.
#[must_use]
pub fn snap_position(rect: Rect, work_area: Rect, others: &[Rect], threshold: f64) -> (f64, f64) {
    let mut x_candidates = vec![work_area.x, work_area.right() - rect.width];
    let mut y_candidates = vec![work_area.y, work_area.bottom() - rect.height];

    for other in others {
        x_candidates.extend([other.right(), other.x - rect.width, other.x]);
        y_candidates.extend([other.bottom(), other.y - rect.height, other.y]);
    }

    (snap_axis(rect.x, &x_candidates, threshold), snap_axis(rect.y, &y_candidates, threshold))
}

fn snap_axis(value: f64, candidates: &[f64], threshold: f64) -> f64 {
    candidates
        .iter()
        .map(|&candidate| (candidate, (candidate - value).abs()))
        .filter(|(_, distance)| *distance <= threshold)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(value, |(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> Monitor { Monitor::new(0, Rect::new(0.0, 0.0, 1920.0, 1080.0), 1.0) }

    #[test]
    fn test_clamp_shifts_without_resizing() {
        let clamped = reconcile(Rect::new(1900.0, 1060.0, 300.0, 140.0), &[full_hd()]);

        assert!(clamped.right() <= 1920.0);
        assert!(clamped.bottom() <= 1080.0);
        assert!((clamped.width - 300.0).abs() < f64::EPSILON);
        assert!((clamped.height - 140.0).abs() < f64::EPSILON);
        assert!((clamped.x - 1620.0).abs() < f64::EPSILON);
        assert!((clamped.y - 940.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_never_grows() {
        let work_area = Rect::new(0.0, 0.0, 800.0, 600.0);
        let small = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert_eq!(clamp_to_work_area(small, work_area), small);

        let huge = clamp_to_work_area(Rect::new(-50.0, -50.0, 1000.0, 700.0), work_area);
        assert_eq!(huge, work_area);
    }

    #[test]
    fn test_clamp_respects_scale_factor() {
        let monitor = Monitor::new(0, Rect::new(0.0, 0.0, 2880.0, 1620.0), 1.5);
        let clamped = reconcile(Rect::new(1900.0, 1060.0, 300.0, 140.0), &[monitor]);
        assert!((clamped.x - 1620.0).abs() < 1e-9);
        assert!((clamped.y - 940.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_uses_monitor_under_window() {
        let mut left = full_hd();
        left.work_area = Rect::new(0.0, 0.0, 1920.0, 1040.0);
        let right = Monitor::new(1, Rect::new(1920.0, 0.0, 1920.0, 1080.0), 1.0);

        let clamped = reconcile(Rect::new(3700.0, 1000.0, 300.0, 140.0), &[left, right]);
        assert!((clamped.x - 3540.0).abs() < f64::EPSILON);
        assert!((clamped.y - 940.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monitor_fallbacks() {
        let mut primary = Monitor::new(5, Rect::new(0.0, 0.0, 1920.0, 1080.0), 1.0);
        primary.is_primary = true;
        let other = Monitor::new(6, Rect::new(1920.0, 0.0, 1280.0, 1024.0), 1.0);
        let monitors = [other, primary];

        let overlapping = Rect::new(1800.0, -100.0, 200.0, 150.0);
        assert_eq!(monitor_for_rect(&overlapping, &monitors).map(|m| m.id), Some(5));

        let off_screen = Rect::new(-5000.0, -5000.0, 100.0, 100.0);
        assert_eq!(monitor_for_rect(&off_screen, &monitors).map(|m| m.id), Some(5));

        assert!(monitor_for_rect(&off_screen, &[]).is_none());
        assert_eq!(reconcile(off_screen, &[]), off_screen);
    }

    #[test]
    fn test_snap_to_edges_and_neighbors() {
        let work_area = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let (x, y) = snap_position(Rect::new(6.0, 300.0, 200.0, 100.0), work_area, &[], 10.0);
        assert!(x.abs() < f64::EPSILON);
        assert!((y - 300.0).abs() < f64::EPSILON);

        let neighbor = Rect::new(500.0, 300.0, 200.0, 100.0);
        let (x, y) = snap_position(Rect::new(705.0, 296.0, 200.0, 100.0), work_area, &[neighbor], 10.0);
        assert!((x - 700.0).abs() < f64::EPSILON);
        assert!((y - 300.0).abs() < f64::EPSILON);

        let (x, _) = snap_position(Rect::new(730.0, 296.0, 200.0, 100.0), work_area, &[neighbor], 10.0);
        assert!((x - 730.0).abs() < f64::EPSILON);
    }
}
