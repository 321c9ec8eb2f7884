//! Fence lifecycle: load, create, delete, reload, and the timers that keep
//! live windows consistent.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::{FenceEvent, FenceManager, FenceProperty};
use crate::constants::{DEFAULT_FENCE_HEIGHT, DEFAULT_FENCE_TITLE, DEFAULT_FENCE_WIDTH};
use crate::error::FencesError;
use crate::modules::fences::bounds::reconcile;
use crate::modules::fences::host::WaitIndicator;
use crate::modules::fences::migration::{migrate, partition_invalid_portals};
use crate::modules::fences::portal::{PortalMirror, is_valid_portal_path};
use crate::modules::fences::shortcuts::ShortcutResolver;
use crate::modules::fences::state::{
    FenceRecord, ItemsType, Rect, StoreError, parse_document, read_document,
};
use crate::modules::fences::window::FenceWindow;
use crate::platform::{RepeatingTask, UiSender, spawn_named_thread};

const LOG: &str = crate::logging::GENERAL;
const RELOAD_MESSAGE: &str = "Reloading fences...";

// ============================================================================
// Loading
// ============================================================================

/// Records read from disk, migrated, and stripped of dead Portal fences.
#[derive(Debug)]
pub struct PreparedRecords {
    pub records: Vec<FenceRecord>,
    /// Whether the document must be rewritten.
    pub modified: bool,
    /// Number of Portal fences dropped because their folder is gone.
    pub purged: usize,
}

/// Reads, migrates, and validates the document at `path`.
///
/// Does no UI work, so background reloads run it off the UI thread.
pub fn prepare_records(path: &Path, resolver: &dyn ShortcutResolver) -> Result<PreparedRecords, StoreError> {
    let seeded = is_blank_document(path);
    let records = read_document(path)?;

    let started = Instant::now();
    let (records, migrated) = migrate(records, resolver);
    let (records, purged) = partition_invalid_portals(records);

    for record in &purged {
        tracing::warn!(
            target: crate::logging::MIGRATION,
            fence_id = %record.id,
            path = record.path.as_deref().unwrap_or_default(),
            "portal folder is missing, fence removed"
        );
    }
    tracing::debug!(
        target: crate::logging::PERFORMANCE,
        fences = records.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "records prepared"
    );

    Ok(PreparedRecords { modified: seeded || migrated || !purged.is_empty(), purged: purged.len(), records })
}

/// Whether the document is missing or holds no fences.
fn is_blank_document(path: &Path) -> bool {
    fs::read_to_string(path).map_or(true, |content| parse_document(&content).is_ok_and(|records| records.is_empty()))
}

/// Clears the reloading flag if the reload thread dies before posting its
/// result.
struct ReloadFinished(Option<UiSender<FenceManager>>);

impl ReloadFinished {
    /// The result was posted; applying it clears the flag.
    fn disarm(mut self) { self.0 = None; }
}

impl Drop for ReloadFinished {
    fn drop(&mut self) {
        if let Some(sender) = self.0.take() {
            tracing::warn!(target: LOG, "reload thread ended without a result");
            sender.post(|manager: &mut FenceManager| {
                manager.reloading = false;
            });
        }
    }
}

impl FenceManager {
    /// Loads the document and opens a window per fence.
    ///
    /// A document that cannot be parsed at all is fatal and nothing is
    /// opened. Returns the number of windows opened.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        let prepared = prepare_records(self.store.path(), self.services.resolver.as_ref())?;
        let opened = self.install(prepared);
        self.start_target_polling();
        Ok(opened)
    }

    /// Replaces every record and window with `prepared`.
    fn install(&mut self, prepared: PreparedRecords) -> usize {
        self.close_all_windows();
        self.guard.clear_all();
        self.hidden.clear();
        self.peek_until = None;

        self.store.replace_all(prepared.records);
        if prepared.modified {
            self.persist();
        }
        self.open_all_windows()
    }

    fn open_all_windows(&mut self) -> usize {
        let opened = self.store.snapshot().iter().filter(|record| self.open_window(record)).count();
        tracing::info!(target: LOG, fences = self.store.len(), windows = opened, "fence windows opened");
        opened
    }

    /// Builds the window for `record`. A record that cannot be shown is
    /// removed from the store.
    fn open_window(&mut self, record: &FenceRecord) -> bool {
        let clamped = self.clamp_before_open(record);
        let record = clamped.as_ref().unwrap_or(record);

        let surface = self.host.create_surface(&record.id, record.items_type);
        let mut window = match FenceWindow::open(record, surface, &self.config.appearance) {
            Ok(window) => window,
            Err(err) => {
                tracing::warn!(target: LOG, fence_id = %record.id, error = %err, "fence cannot be shown, removed");
                if self.store.remove(&record.id).is_some() {
                    self.persist();
                }
                return false;
            }
        };

        if record.items_type == ItemsType::Portal
            && let Some(path) = record.path.as_deref()
        {
            window.attach_portal(self.portal_mirror(&record.id, path));
        }

        self.windows.insert(record.id.clone(), window);
        if record.is_hidden() {
            self.hidden.add(&record.id, &record.title);
        }
        self.sync_poll_targets(&record.id);
        true
    }

    /// Clamps a record into the work area before its window is first laid
    /// out, writing the new bounds back. Returns the updated record when
    /// anything moved.
    fn clamp_before_open(&mut self, record: &FenceRecord) -> Option<FenceRecord> {
        let rolled = record.is_rolled();
        let full = if rolled { Rect { height: record.restore_height(), ..record.bounds() } } else { record.bounds() };
        let clamped = reconcile(full, &self.host.monitors());
        if clamped.approx_eq(&full, 1e-6) {
            return None;
        }

        tracing::info!(
            target: crate::logging::UI,
            fence_id = %record.id,
            x = clamped.x,
            y = clamped.y,
            "fence clamped into work area"
        );
        self.write_clamped_bounds(&record.id, clamped, rolled);
        self.store.find_by_id(&record.id).cloned()
    }

    fn write_clamped_bounds(&mut self, id: &str, clamped: Rect, rolled: bool) {
        self.update_property(id, FenceProperty::X(clamped.x));
        self.update_property(id, FenceProperty::Y(clamped.y));
        self.update_property(id, FenceProperty::Width(clamped.width));
        if !rolled {
            self.update_property(id, FenceProperty::Height(clamped.height));
        }
    }

    fn portal_mirror(&self, id: &str, path: &str) -> PortalMirror {
        let Some(sender) = self.ui.clone() else {
            return PortalMirror::new(path.trim());
        };

        let id = id.to_string();
        PortalMirror::watched(path.trim(), move || {
            let id = id.clone();
            sender.post(move |manager: &mut Self| manager.handle_event(&id, FenceEvent::PortalChanged));
        })
    }

    fn close_window(&mut self, id: &str) -> bool {
        let Some(mut window) = self.windows.remove(id) else {
            return false;
        };
        let released = window.close();
        self.release_targets(released);
        self.guard.end(id);
        true
    }

    fn close_all_windows(&mut self) {
        let ids: Vec<String> = self.windows.keys().cloned().collect();
        for id in ids {
            self.close_window(&id);
        }
    }

    /// Stops the watchdog and the target poller and closes every window.
    pub fn shutdown(&mut self) {
        if let Some(mut watchdog) = self.watchdog.take() {
            watchdog.stop();
        }
        self.services.poller.stop();
        self.close_all_windows();
        tracing::debug!(target: LOG, "fence manager shut down");
    }

    // ========================================================================
    // Create & Delete
    // ========================================================================

    /// Creates a fence at `(x, y)` and opens its window.
    ///
    /// Portal fences ask the user for their folder first.
    pub fn create_fence(&mut self, kind: ItemsType, x: f64, y: f64) -> Result<String, FencesError> {
        if kind == ItemsType::Portal {
            let Some(folder) = self.services.prompt.pick_folder() else {
                return Err(FencesError::InvalidArguments("No folder selected for the portal fence".to_string()));
            };
            return self.create_portal_fence(&folder, x, y);
        }

        let bounds = Rect::new(x, y, DEFAULT_FENCE_WIDTH, DEFAULT_FENCE_HEIGHT);
        self.insert_fence(FenceRecord::new(kind, DEFAULT_FENCE_TITLE, bounds))
    }

    /// Creates a Portal fence mirroring `folder`.
    pub fn create_portal_fence(&mut self, folder: &Path, x: f64, y: f64) -> Result<String, FencesError> {
        let path = folder.to_string_lossy().into_owned();
        if !is_valid_portal_path(Some(&path)) {
            return Err(FencesError::InvalidArguments(format!("Not a folder: {}", folder.display())));
        }

        let title = folder.file_name().map_or_else(|| path.clone(), |name| name.to_string_lossy().into_owned());
        let bounds = Rect::new(x, y, DEFAULT_FENCE_WIDTH, DEFAULT_FENCE_HEIGHT);
        self.insert_fence(FenceRecord::new_portal(title, bounds, path))
    }

    fn insert_fence(&mut self, record: FenceRecord) -> Result<String, FencesError> {
        let id = record.id.clone();
        let kind = record.items_type;
        self.store.add(record.clone());
        self.store.save()?;

        if !self.open_window(&record) {
            return Err(FencesError::CommandError(format!("Fence {id} could not be shown")));
        }
        tracing::info!(target: crate::logging::CREATION, fence_id = %id, kind = %kind, "fence created");
        Ok(id)
    }

    /// Deletes a fence after the user confirms.
    ///
    /// Closes its window and drops it from every index. Returns whether the
    /// fence was deleted.
    pub fn delete_fence(&mut self, id: &str) -> bool {
        let Some(record) = self.store.find_by_id(id) else {
            tracing::warn!(target: crate::logging::CREATION, fence_id = %id, "delete of unknown fence ignored");
            return false;
        };

        let message = format!("Delete the fence \"{}\"? Its items are removed from the desktop.", record.title);
        if !self.services.prompt.confirm("Delete fence", &message) {
            tracing::debug!(target: crate::logging::CREATION, fence_id = %id, "delete cancelled");
            return false;
        }

        self.close_window(id);
        self.hidden.remove(id);
        if self.store.remove(id).is_none() {
            return false;
        }
        self.persist();
        tracing::info!(target: crate::logging::CREATION, fence_id = %id, "fence deleted");
        true
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Re-reads the document and rebuilds every window, on this thread.
    pub fn reload_all(&mut self) -> Result<usize, FencesError> {
        let _wait = WaitIndicator::show(Arc::clone(&self.services.prompt), RELOAD_MESSAGE);
        let result = prepare_records(self.store.path(), self.services.resolver.as_ref());
        self.apply_reload(result).map_err(FencesError::from)
    }

    /// Starts a reload whose file work runs on a background thread.
    ///
    /// The records are applied when the UI queue is next drained. Returns
    /// `false` without a UI queue or while another reload is running.
    pub fn begin_reload(&mut self) -> bool {
        let Some(sender) = self.ui.clone() else {
            tracing::debug!(target: LOG, "background reload needs a UI queue");
            return false;
        };
        if self.reloading {
            tracing::debug!(target: LOG, "reload already in progress");
            return false;
        }

        let wait = WaitIndicator::show(Arc::clone(&self.services.prompt), RELOAD_MESSAGE);
        let path = self.store.path().to_path_buf();
        let resolver = Arc::clone(&self.services.resolver);

        let spawned = spawn_named_thread("reload", move || {
            let finished = ReloadFinished(Some(sender.clone()));
            let result = prepare_records(&path, resolver.as_ref());
            sender.post(move |manager: &mut Self| {
                match manager.apply_reload(result) {
                    Ok(opened) => tracing::debug!(target: LOG, windows = opened, "background reload applied"),
                    Err(err) => tracing::debug!(target: LOG, error = %err, "background reload discarded"),
                }
                drop(wait);
            });
            finished.disarm();
        });

        self.reloading = spawned.is_some();
        self.reloading
    }

    #[must_use]
    pub const fn is_reloading(&self) -> bool { self.reloading }

    fn apply_reload(&mut self, result: Result<PreparedRecords, StoreError>) -> Result<usize, StoreError> {
        self.reloading = false;
        match result {
            Ok(prepared) => {
                let opened = self.install(prepared);
                tracing::info!(target: LOG, windows = opened, "fences reloaded");
                Ok(opened)
            }
            Err(err) => {
                tracing::error!(target: LOG, error = %err, "reload failed");
                self.services.prompt.notify("Reload failed", &err.to_string());
                Err(err)
            }
        }
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// Clamps a fence into the work area of the monitor it is on and writes
    /// the result back. Returns whether anything moved.
    ///
    /// Rolled fences are clamped at their expanded height so they still fit
    /// when unrolled.
    pub fn reconcile_bounds(&mut self, id: &str) -> bool {
        let (Some(record), Some(window)) = (self.store.find_by_id(id), self.windows.get_mut(id)) else {
            return false;
        };

        let rolled = record.is_rolled();
        let current = window.bounds();
        let full = if rolled { Rect { height: record.restore_height(), ..current } } else { current };
        let clamped = reconcile(full, &self.host.monitors());
        if clamped.approx_eq(&full, 1e-6) {
            return false;
        }

        let height = if rolled { current.height } else { clamped.height };
        window.set_bounds(Rect { height, ..clamped });
        tracing::info!(
            target: crate::logging::UI,
            fence_id = %id,
            x = clamped.x,
            y = clamped.y,
            "fence clamped into work area"
        );

        self.write_clamped_bounds(id, clamped, rolled);
        true
    }

    /// Re-clamps every fence, e.g. after the display layout changed.
    pub fn reconcile_all_bounds(&mut self) -> usize {
        let ids: Vec<String> = self.window_ids();
        ids.iter().filter(|id| self.reconcile_bounds(id)).count()
    }

    // ========================================================================
    // Animation & Timers
    // ========================================================================

    /// Advances every roll animation to `now`.
    ///
    /// Finished rolls leave the transition guard. Also ends an expired peek.
    /// Returns the number of rolls still running.
    pub fn advance_animations(&mut self, now: Instant) -> usize {
        let mut running = 0;
        for (id, window) in &mut self.windows {
            if !window.is_transitioning() {
                continue;
            }
            match window.advance_roll(now) {
                Some(state) => {
                    self.guard.end(id);
                    tracing::debug!(target: crate::logging::UI, fence_id = %id, state = %state, "roll finished");
                }
                None => running += 1,
            }
        }

        if self.peek_until.is_some_and(|until| now >= until) {
            self.end_peek();
        }
        running
    }

    /// Jumps every running roll to its end.
    pub fn finish_animations(&mut self) {
        for (id, window) in &mut self.windows {
            if window.finish_roll().is_some() {
                self.guard.end(id);
            }
        }
    }

    /// Force-clears a transition guard left populated by a roll that never
    /// finished. Returns the number of fences released.
    pub fn run_guard_watchdog(&mut self) -> usize {
        if self.guard.is_empty() {
            return 0;
        }

        let cleared = self.guard.clear_all();
        tracing::warn!(
            target: crate::logging::UI,
            fences = ?cleared,
            "transition guard still held, force-cleared"
        );
        for id in &cleared {
            if let Some(window) = self.windows.get_mut(id) {
                window.finish_roll();
            }
        }
        cleared.len()
    }

    /// Starts the guard watchdog timer. It posts onto the UI queue.
    pub fn start_watchdog(&mut self) -> bool {
        let Some(sender) = self.ui.clone() else {
            return false;
        };

        let interval = self.config.behavior.watchdog_interval();
        self.watchdog = RepeatingTask::spawn("guard-watchdog", interval, move || {
            sender.post(|manager: &mut Self| {
                manager.run_guard_watchdog();
            });
        });
        self.watchdog.is_some()
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Hides every fence window for the configured peek duration.
    pub fn peek_behind(&mut self, now: Instant) {
        for window in self.windows.values_mut() {
            window.set_visible(false);
        }
        self.peek_until = Some(now + self.config.behavior.peek_duration());
        tracing::info!(target: crate::logging::UI, "peeking behind fences");
    }

    /// Shows the fences again after a peek. Hidden fences stay hidden.
    pub fn end_peek(&mut self) {
        if self.peek_until.take().is_none() {
            return;
        }
        for record in self.store.records() {
            if let Some(window) = self.windows.get_mut(&record.id) {
                window.set_visible(!record.is_hidden());
            }
        }
    }

    #[must_use]
    pub const fn is_peeking(&self) -> bool { self.peek_until.is_some() }

    pub fn hide_fence(&mut self, id: &str) -> super::UpdateOutcome {
        self.update_property(id, FenceProperty::IsHidden(true))
    }

    pub fn show_fence(&mut self, id: &str) -> super::UpdateOutcome {
        self.update_property(id, FenceProperty::IsHidden(false))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::constants::COLLAPSED_HEIGHT;
    use crate::modules::fences::animation::RollState;
    use crate::modules::fences::host::PromptCall;
    use crate::modules::fences::manager::Services;
    use crate::modules::fences::manager::testing::Harness;
    use crate::modules::fences::state::Monitor;
    use crate::platform::UiQueue;

    fn write_document(h: &Harness, json: &str) { fs::write(h.manager.document_path(), json).unwrap(); }

    #[test]
    fn test_load_without_document_seeds_default_fence() {
        let h = Harness::loaded();
        let records = read_document(h.manager.document_path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, DEFAULT_FENCE_TITLE);
        assert_eq!(h.host.open_ids(), vec![records[0].id.clone()]);
    }

    #[test]
    fn test_load_rejects_malformed_document() {
        let mut h = Harness::new();
        write_document(&h, "{ not json");
        assert!(matches!(h.manager.load(), Err(StoreError::Parse { .. })));
        assert!(h.host.open_ids().is_empty());
    }

    #[test]
    fn test_load_purges_missing_portals() {
        let mut h = Harness::new();
        let folder = h.dir.path().join("Downloads");
        fs::create_dir(&folder).unwrap();
        let json = serde_json::json!([
            { "Id": "keep", "Title": "Downloads", "ItemsType": "Portal", "Path": folder, "Width": 200, "Height": 200 },
            { "Id": "gone", "Title": "Old", "ItemsType": "Portal", "Path": "/definitely/not/here", "Width": 200, "Height": 200 }
        ]);
        write_document(&h, &json.to_string());

        assert_eq!(h.manager.load().unwrap(), 1);
        assert!(h.manager.record("gone").is_none());
        let persisted = read_document(h.manager.document_path()).unwrap();
        assert_eq!(persisted.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["keep"]);
        assert!(h.manager.window("keep").unwrap().portal().is_some());
    }

    #[test]
    fn test_create_and_delete_fence() {
        let mut h = Harness::loaded();
        let id = h.manager.create_fence(ItemsType::Data, 300.0, 200.0).unwrap();

        let record = h.manager.record(&id).unwrap();
        assert!((record.x - 300.0).abs() < f64::EPSILON);
        assert_eq!(read_document(h.manager.document_path()).unwrap().len(), 2);

        h.prompt.set_answer(false);
        assert!(!h.manager.delete_fence(&id));
        assert!(h.manager.record(&id).is_some());

        h.prompt.set_answer(true);
        assert!(h.manager.delete_fence(&id));
        assert!(h.manager.record(&id).is_none());
        assert!(h.host.surface(&id).unwrap().closed);
        assert_eq!(read_document(h.manager.document_path()).unwrap().len(), 1);
    }

    #[test]
    fn test_create_portal_fence_uses_picked_folder() {
        let mut h = Harness::loaded();
        assert!(h.manager.create_fence(ItemsType::Portal, 0.0, 0.0).is_err());

        let folder = h.dir.path().join("Projects");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("notes.txt"), "x").unwrap();
        h.prompt.set_folder(Some(folder));

        let id = h.manager.create_fence(ItemsType::Portal, 0.0, 0.0).unwrap();
        let record = h.manager.record(&id).unwrap();
        assert_eq!(record.title, "Projects");
        assert_eq!(h.host.surface(&id).unwrap().items.len(), 1);

        let missing = h.dir.path().join("missing");
        assert!(h.manager.create_portal_fence(&missing, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_roll_animation_releases_guard() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        h.manager.update_property(&id, FenceProperty::IsRolled(true));
        assert!(h.manager.is_transitioning(&id));

        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(h.manager.advance_animations(later), 0);
        assert!(!h.manager.is_transitioning(&id));
        assert_eq!(h.manager.window(&id).unwrap().roll_state(), RollState::Collapsed);
        assert!((h.host.surface(&id).unwrap().bounds.height - COLLAPSED_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_watchdog_clears_stuck_guard() {
        let mut h = Harness::loaded();
        let id = h.first_id();
        h.manager.update_property(&id, FenceProperty::IsRolled(true));

        assert_eq!(h.manager.run_guard_watchdog(), 1);
        assert!(!h.manager.is_transitioning(&id));
        assert_eq!(h.manager.window(&id).unwrap().roll_state(), RollState::Collapsed);
        assert_eq!(h.manager.run_guard_watchdog(), 0);
    }

    #[test]
    fn test_watchdog_timer_posts_to_ui_queue() {
        let mut h = Harness::new();
        h.manager.config.behavior.watchdog_interval_secs = 1;
        let mut queue = UiQueue::new();
        h.manager.attach_ui(queue.sender());
        h.manager.load().unwrap();
        let id = h.first_id();

        h.manager.guard.begin(&id);
        assert!(h.manager.start_watchdog());
        assert!(queue.drain_until(&mut h.manager, Duration::from_secs(5), |m| !m.is_transitioning(&id)));
        h.manager.shutdown();
    }

    #[test]
    fn test_peek_behind_restores_visibility() {
        let mut h = Harness::loaded();
        let first = h.first_id();
        let second = h.manager.create_fence(ItemsType::Data, 500.0, 100.0).unwrap();
        h.manager.hide_fence(&second);

        let now = Instant::now();
        h.manager.peek_behind(now);
        assert!(h.manager.is_peeking());
        assert!(!h.host.surface(&first).unwrap().visible);

        h.manager.advance_animations(now + Duration::from_secs(60));
        assert!(!h.manager.is_peeking());
        assert!(h.host.surface(&first).unwrap().visible);
        assert!(!h.host.surface(&second).unwrap().visible);
    }

    #[test]
    fn test_reconcile_after_display_change() {
        let mut h = Harness::loaded();
        let id = h.manager.create_fence(ItemsType::Data, 1600.0, 800.0).unwrap();
        assert_eq!(h.manager.reconcile_all_bounds(), 0);

        h.host.set_monitors(vec![Monitor::new(0, Rect::new(0.0, 0.0, 1280.0, 720.0), 1.0)]);
        assert_eq!(h.manager.reconcile_all_bounds(), 1);

        let record = h.manager.record(&id).unwrap();
        assert!((record.x - 1050.0).abs() < f64::EPSILON);
        assert!((record.y - 590.0).abs() < f64::EPSILON);
        assert!((record.width - DEFAULT_FENCE_WIDTH).abs() < f64::EPSILON);
        assert_eq!(h.host.surface(&id).unwrap().bounds, Rect::new(1050.0, 590.0, 230.0, 130.0));
    }

    #[test]
    fn test_offscreen_fence_is_clamped_before_first_layout() {
        let mut h = Harness::new();
        write_document(
            &h,
            r#"[{"Id":"edge","Title":"Edge","ItemsType":"Data","Items":[],"X":1900,"Y":1060,"Width":300,"Height":140}]"#,
        );
        h.manager.load().unwrap();

        let expected = Rect::new(1620.0, 940.0, 300.0, 140.0);
        assert_eq!(h.host.surface("edge").unwrap().bounds_history, vec![expected]);
        assert_eq!(h.manager.record("edge").unwrap().bounds(), expected);
        assert!((read_document(h.manager.document_path()).unwrap()[0].x - 1620.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rolled_fence_is_clamped_at_restore_height() {
        let mut h = Harness::new();
        write_document(
            &h,
            r#"[{"Id":"low","Title":"Low","ItemsType":"Data","Items":[],"X":100,"Y":1000,"Width":200,
                 "Height":300,"IsRolled":"true","UnrolledHeight":300}]"#,
        );
        h.manager.load().unwrap();

        let record = h.manager.record("low").unwrap();
        assert!((record.y - 780.0).abs() < f64::EPSILON);
        let first = h.host.surface("low").unwrap().bounds_history[0];
        assert_eq!(first, Rect::new(100.0, 780.0, 200.0, COLLAPSED_HEIGHT));
    }

    #[test]
    fn test_reload_all_picks_up_external_edits() {
        let mut h = Harness::loaded();
        let id = h.first_id();

        let mut records = read_document(h.manager.document_path()).unwrap();
        records[0].title = "Edited elsewhere".to_string();
        fs::write(h.manager.document_path(), crate::modules::fences::state::to_document(&records).unwrap()).unwrap();

        assert_eq!(h.manager.reload_all().unwrap(), 1);
        assert_eq!(h.manager.record(&id).unwrap().title, "Edited elsewhere");
        assert_eq!(h.host.surface(&id).unwrap().title, "Edited elsewhere");
        assert!(!h.prompt.is_waiting());
    }

    #[test]
    fn test_failed_reload_notifies_and_hides_wait() {
        let mut h = Harness::loaded();
        write_document(&h, "[{ broken");

        assert!(h.manager.reload_all().is_err());
        assert!(!h.prompt.is_waiting());
        assert!(h.prompt.calls().iter().any(|c| matches!(c, PromptCall::Notify { title, .. } if title == "Reload failed")));
    }

    /// Panics once armed, standing in for a reload that dies mid-way.
    #[derive(Default)]
    struct ExplodingResolver {
        armed: std::sync::atomic::AtomicBool,
    }

    impl ShortcutResolver for ExplodingResolver {
        fn is_shortcut(&self, _path: &Path) -> bool {
            assert!(!self.armed.load(std::sync::atomic::Ordering::SeqCst), "resolver exploded");
            false
        }

        fn resolve(&self, _path: &Path) -> Option<crate::modules::fences::shortcuts::ShortcutTarget> { None }

        fn create(&self, _dir: &Path, _target: &str) -> std::io::Result<std::path::PathBuf> {
            Err(std::io::Error::other("unsupported"))
        }
    }

    #[test]
    fn test_panicked_background_reload_clears_flag() {
        let mut h = Harness::new();
        let resolver = Arc::new(ExplodingResolver::default());
        let services = Services { resolver: resolver.clone(), ..h.manager.services().clone() };
        h.manager = FenceManager::new(h.manager.config().clone(), Box::new(h.host.clone()), services);

        let mut queue = UiQueue::new();
        h.manager.attach_ui(queue.sender());
        h.manager.load().unwrap();
        let id = h.first_id();

        write_document(&h, r#"[{"Id":"new","Title":"New","ItemsType":"Data","Items":[{"Filename":"/tmp/x"}]}]"#);
        resolver.armed.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(h.manager.begin_reload());
        assert!(queue.drain_until(&mut h.manager, Duration::from_secs(5), |m| !m.is_reloading()));
        assert!(!h.prompt.is_waiting());
        assert_eq!(h.manager.window_ids(), vec![id]);
    }

    #[test]
    fn test_background_reload_applies_on_ui_queue() {
        let mut h = Harness::new();
        let mut queue = UiQueue::new();
        h.manager.attach_ui(queue.sender());
        h.manager.load().unwrap();

        assert!(h.manager.begin_reload());
        assert!(!h.manager.begin_reload());
        assert!(queue.drain_until(&mut h.manager, Duration::from_secs(5), |m| !m.is_reloading()));
        assert!(!h.prompt.is_waiting());
        assert_eq!(h.manager.window_ids().len(), 1);
    }
}
