//! Target poller registrations for Data fence items.
//!
//! Every window tracks the targets its items point at. A target shared by
//! several fences is registered once and stays registered until the last
//! window tracking it lets go.

use std::sync::Arc;

use super::FenceManager;
use crate::modules::fences::poller::{TargetCallback, TargetCheck};
use crate::modules::fences::shortcuts::resolve_target;
use crate::modules::fences::state::{FenceRecord, ItemsType};
use crate::platform::path::{is_network_path, is_web_link};

const LOG: &str = crate::logging::ICONS;

/// A target worth polling: its path and whether it must be a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    path: String,
    is_directory: bool,
}

impl FenceManager {
    /// Targets of the active items of `record` that can be checked on disk.
    fn poll_candidates(&self, record: &FenceRecord) -> Vec<Candidate> {
        if record.items_type != ItemsType::Data {
            return Vec::new();
        }

        let check_network = self.config.behavior.check_network_paths;
        let mut candidates: Vec<Candidate> = Vec::new();
        for item in record.active_items() {
            let target = resolve_target(self.services.resolver.as_ref(), &item.filename).target;
            if target.trim().is_empty() || is_web_link(&target) {
                continue;
            }
            if !check_network && (item.is_network() || is_network_path(&target)) {
                continue;
            }
            if !candidates.iter().any(|c| c.path == target) {
                candidates.push(Candidate { path: target, is_directory: item.is_folder() });
            }
        }
        candidates
    }

    /// Starts the poller timer at the configured interval.
    ///
    /// Poll results reach the windows through the UI queue, so nothing is
    /// started without one. Returns whether the poller was started.
    pub fn start_target_polling(&self) -> bool {
        if self.ui.is_none() {
            tracing::debug!(target: LOG, "target polling needs a UI queue");
            return false;
        }
        self.services.poller.start(self.config.behavior.poll_interval());
        true
    }

    /// Brings the poller registrations of `id` in line with its items.
    pub(super) fn sync_poll_targets(&mut self, id: &str) {
        let Some(record) = self.store.find_by_id(id) else {
            return;
        };
        let candidates = self.poll_candidates(record);
        let callback = self.target_callback();

        let Some(window) = self.windows.get_mut(id) else {
            return;
        };

        let stale: Vec<String> = window
            .poll_targets()
            .iter()
            .filter(|path| !candidates.iter().any(|c| &c.path == *path))
            .cloned()
            .collect();
        for path in &stale {
            window.untrack_poll_target(path);
        }

        let poller = Arc::clone(&self.services.poller);
        for candidate in candidates {
            window.track_poll_target(&candidate.path);
            if !poller.is_registered(&candidate.path) {
                poller.register(TargetCheck {
                    path: candidate.path,
                    is_directory: candidate.is_directory,
                    on_change: Arc::clone(&callback),
                });
            }
        }

        self.release_targets(stale);
        self.apply_broken_marks(id);
    }

    /// Marks the icons of `id` whose target is known to be missing.
    ///
    /// The poller only reports changes, so a re-rendered item list gets its
    /// broken marks from here.
    fn apply_broken_marks(&mut self, id: &str) {
        if self.broken_targets.is_empty() {
            return;
        }
        let (Some(record), Some(window)) = (self.store.find_by_id(id), self.windows.get_mut(id)) else {
            return;
        };

        let resolver = self.services.resolver.as_ref();
        for (index, item) in record.active_items().iter().enumerate() {
            if self.broken_targets.contains(&resolve_target(resolver, &item.filename).target) {
                window.set_item_broken(index, true);
            }
        }
    }

    /// Unregisters every path in `paths` that no open window still tracks.
    pub(super) fn release_targets(&mut self, paths: Vec<String>) {
        for path in paths {
            let shared = self.windows.values().any(|window| window.poll_targets().contains(&path));
            if !shared {
                self.services.poller.unregister(&path);
                self.broken_targets.remove(&path);
            }
        }
    }

    /// The poller callback: hops onto the UI queue when one is attached.
    fn target_callback(&self) -> TargetCallback {
        let sender = self.ui.clone();
        Arc::new(move |path: &str, exists: bool| {
            let Some(sender) = &sender else {
                return;
            };
            let path = path.to_string();
            sender.post(move |manager: &mut Self| {
                manager.on_target_status(&path, exists);
            });
        })
    }

    /// Marks every item resolving to `path` as broken or healthy.
    ///
    /// Returns the number of icons updated.
    pub fn on_target_status(&mut self, path: &str, exists: bool) -> usize {
        let resolver = Arc::clone(&self.services.resolver);
        let mut updated = 0;
        if exists {
            self.broken_targets.remove(path);
        } else {
            self.broken_targets.insert(path.to_string());
        }

        for record in self.store.records() {
            let Some(window) = self.windows.get_mut(&record.id) else {
                continue;
            };
            if !window.poll_targets().iter().any(|p| p == path) {
                continue;
            }
            for (index, item) in record.active_items().iter().enumerate() {
                if resolve_target(resolver.as_ref(), &item.filename).target == path {
                    window.set_item_broken(index, !exists);
                    updated += 1;
                }
            }
        }

        if exists {
            tracing::info!(target: LOG, path = %path, icons = updated, "target is back");
        } else {
            tracing::warn!(target: LOG, path = %path, icons = updated, "target is missing");
        }
        updated
    }
}
