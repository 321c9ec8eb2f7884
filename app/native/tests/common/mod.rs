//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use fences_lib::config::FencesConfig;
use fences_lib::constants::DOCUMENT_FILE_NAME;
use fences_lib::modules::fences::host::{HeadlessHost, HeadlessPrompt, HeadlessShell};
use fences_lib::modules::fences::poller::ThreadedPoller;
use fences_lib::modules::fences::shortcuts::InternetShortcutResolver;
use fences_lib::modules::fences::state::{Monitor, Rect};
use fences_lib::modules::fences::{FenceManager, Services};
use tempfile::TempDir;

/// A data directory plus a manager over it on the headless host.
pub struct Env {
    pub dir: TempDir,
    pub host: HeadlessHost,
    pub prompt: Arc<HeadlessPrompt>,
    pub manager: FenceManager,
}

impl Env {
    /// An unloaded manager on a single 1920x1080 display.
    pub fn new() -> Self { Self::with_monitors(vec![Monitor::new(0, Rect::new(0.0, 0.0, 1920.0, 1080.0), 1.0)]) }

    pub fn with_monitors(monitors: Vec<Monitor>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let host = HeadlessHost::with_monitors(monitors);
        let prompt = Arc::new(HeadlessPrompt::new(true));
        let manager = manager_for(&dir, &host, prompt.clone());
        Self { dir, host, prompt, manager }
    }

    /// Writes `content` as the fence document before anything loads it.
    pub fn with_document(content: &str) -> Self {
        let env = Self::new();
        std::fs::write(env.document(), content).unwrap();
        env
    }

    pub fn document(&self) -> PathBuf { self.dir.path().join(DOCUMENT_FILE_NAME) }

    pub fn read_document(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(self.document()).unwrap()).unwrap()
    }

    /// Shuts the manager down and loads the same directory into a new one.
    pub fn restart(&mut self) {
        self.manager.shutdown();
        self.host = HeadlessHost::with_monitors(fences_lib::modules::fences::host::WindowHost::monitors(&self.host));
        self.manager = manager_for(&self.dir, &self.host, self.prompt.clone());
        self.manager.load().unwrap();
    }
}

fn manager_for(dir: &TempDir, host: &HeadlessHost, prompt: Arc<HeadlessPrompt>) -> FenceManager {
    let config = FencesConfig {
        data_dir: Some(dir.path().to_string_lossy().into_owned()),
        ..FencesConfig::default()
    };
    let services = Services {
        poller: Arc::new(ThreadedPoller::new()),
        resolver: Arc::new(InternetShortcutResolver),
        prompt,
        shell: Arc::new(HeadlessShell::new()),
    };
    FenceManager::new(config, Box::new(host.clone()), services)
}
