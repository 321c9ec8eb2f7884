//! Target existence polling.
//!
//! Items register the filesystem path they point at; the poller checks each
//! one on its own timer thread and reports when a target disappears or comes
//! back. Callbacks run on the poller thread, so they must marshal onto the
//! UI queue before touching fence state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::platform::RepeatingTask;

/// Called with `(path, exists)` whenever a target's existence changes.
pub type TargetCallback = Arc<dyn Fn(&str, bool) + Send + Sync>;

/// One registered target.
#[derive(Clone)]
pub struct TargetCheck {
    pub path: String,
    pub is_directory: bool,
    pub on_change: TargetCallback,
}

impl std::fmt::Debug for TargetCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetCheck")
            .field("path", &self.path)
            .field("is_directory", &self.is_directory)
            .finish_non_exhaustive()
    }
}

/// Registry of targets to watch for existence changes.
pub trait TargetPoller: Send + Sync {
    /// Starts watching a target, replacing any registration for the same path.
    fn register(&self, check: TargetCheck);

    /// Stops watching `path`. Unknown paths are ignored.
    fn unregister(&self, path: &str);

    /// Whether `path` is currently registered.
    fn is_registered(&self, path: &str) -> bool;

    /// Starts checking the registered targets every `interval`. Does nothing
    /// if already running.
    fn start(&self, interval: Duration);

    /// Stops the periodic checks. Registrations are kept.
    fn stop(&self);
}

struct Entry {
    check: TargetCheck,
    last_seen: Option<bool>,
}

#[derive(Default)]
struct Registry {
    entries: Mutex<HashMap<String, Entry>>,
}

/// A poller that checks every registered target on a background timer.
///
/// Created idle; [`TargetPoller::start`] spawns the timer thread. An idle
/// poller still keeps its registry, which [`ThreadedPoller::poll_once`] can
/// check on demand.
#[derive(Default)]
pub struct ThreadedPoller {
    registry: Arc<Registry>,
    timer: Mutex<Option<RepeatingTask>>,
}

impl ThreadedPoller {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Checks every target once on the calling thread.
    ///
    /// Returns the number of callbacks fired.
    pub fn poll_once(&self) -> usize { poll_registry(&self.registry) }

    #[must_use]
    pub fn len(&self) -> usize { self.registry.entries.lock().len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl TargetPoller for ThreadedPoller {
    fn register(&self, check: TargetCheck) {
        tracing::trace!(target: crate::logging::ICONS, path = %check.path, "registering target");
        self.registry
            .entries
            .lock()
            .insert(check.path.clone(), Entry { check, last_seen: None });
    }

    fn unregister(&self, path: &str) {
        if self.registry.entries.lock().remove(path).is_some() {
            tracing::trace!(target: crate::logging::ICONS, path = %path, "unregistered target");
        }
    }

    fn is_registered(&self, path: &str) -> bool { self.registry.entries.lock().contains_key(path) }

    fn start(&self, interval: Duration) {
        let mut timer = self.timer.lock();
        if timer.as_ref().is_some_and(RepeatingTask::is_running) {
            return;
        }

        let registry = Arc::clone(&self.registry);
        *timer = RepeatingTask::spawn("target-poller", interval, move || {
            poll_registry(&registry);
        });

        if timer.is_some() {
            tracing::debug!(
                target: crate::logging::ICONS,
                interval_ms = interval.as_millis(),
                "target poller started"
            );
        }
    }

    fn stop(&self) {
        if let Some(mut task) = self.timer.lock().take() {
            task.stop();
        }
    }
}

impl Drop for ThreadedPoller {
    fn drop(&mut self) { self.stop(); }
}

fn target_exists(check: &TargetCheck) -> bool {
    let path = Path::new(&check.path);
    if check.is_directory { path.is_dir() } else { path.exists() }
}

/// Checks every entry and fires callbacks for changed ones.
///
/// A target seen for the first time only reports when it is missing.
/// Callbacks run after the registry lock is released, so they may register
/// or unregister targets themselves.
fn poll_registry(registry: &Registry) -> usize {
    let snapshot: Vec<TargetCheck> =
        registry.entries.lock().values().map(|entry| entry.check.clone()).collect();

    let mut changed = Vec::new();
    for check in snapshot {
        let exists = target_exists(&check);

        let mut entries = registry.entries.lock();
        let Some(entry) = entries.get_mut(&check.path) else {
            continue;
        };
        let report = match entry.last_seen {
            None => !exists,
            Some(previous) => previous != exists,
        };
        entry.last_seen = Some(exists);
        drop(entries);

        if report {
            changed.push((check, exists));
        }
    }

    let count = changed.len();
    for (check, exists) in changed {
        tracing::debug!(
            target: crate::logging::ICONS,
            path = %check.path,
            exists,
            "target existence changed"
        );
        (check.on_change)(&check.path, exists);
    }
    count
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;

    fn recording_check(path: &str, events: &Arc<Mutex<Vec<(String, bool)>>>) -> TargetCheck {
        let events = Arc::clone(events);
        TargetCheck {
            path: path.to_string(),
            is_directory: false,
            on_change: Arc::new(move |p: &str, exists: bool| events.lock().push((p.to_string(), exists))),
        }
    }

    #[test]
    fn test_reports_missing_then_restored() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("target.txt");
        let path = file.to_str().unwrap().to_string();
        let events = Arc::new(Mutex::new(Vec::new()));

        let poller = ThreadedPoller::new();
        poller.register(recording_check(&path, &events));

        assert_eq!(poller.poll_once(), 1);
        assert_eq!(poller.poll_once(), 0);

        fs::write(&file, "x").unwrap();
        assert_eq!(poller.poll_once(), 1);

        fs::remove_file(&file).unwrap();
        assert_eq!(poller.poll_once(), 1);

        assert_eq!(
            *events.lock(),
            vec![(path.clone(), false), (path.clone(), true), (path, false)]
        );
    }

    #[test]
    fn test_existing_target_is_silent_on_first_poll() {
        let dir = tempfile::tempdir().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let poller = ThreadedPoller::new();
        poller.register(recording_check(dir.path().to_str().unwrap(), &events));

        assert_eq!(poller.poll_once(), 0);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_directory_hint_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut check = recording_check(file.to_str().unwrap(), &events);
        check.is_directory = true;
        let poller = ThreadedPoller::new();
        poller.register(check);

        assert_eq!(poller.poll_once(), 1);
        assert!(!events.lock()[0].1);
    }

    #[test]
    fn test_unregister() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let poller = ThreadedPoller::new();
        poller.register(recording_check("/no/such/target", &events));
        assert!(poller.is_registered("/no/such/target"));

        poller.unregister("/no/such/target");
        assert!(!poller.is_registered("/no/such/target"));
        assert!(poller.is_empty());
        assert_eq!(poller.poll_once(), 0);
    }

    #[test]
    fn test_timer_thread_fires_callbacks() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let poller = ThreadedPoller::new();
        poller.register(TargetCheck {
            path: "/no/such/target".to_string(),
            is_directory: false,
            on_change: Arc::new(move |_: &str, _: bool| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        });

        poller.start(Duration::from_millis(10));
        let deadline = Instant::now() + Duration::from_secs(2);
        while fired.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        poller.stop();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
