//! Threading helpers.
//!
//! Fence records and windows are confined to a single UI thread. Background
//! work (target polling, the guard watchdog, folder watchers, reloads) never
//! touches them directly: it posts a task through a [`UiSender`] and the UI
//! thread runs it when it drains its [`UiQueue`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc;

use crate::constants::APP_NAME;

pub fn spawn_named_thread<F>(name: &str, task: F) -> Option<JoinHandle<()>>
where F: FnOnce() + Send + 'static {
    let thread_name = format!("{APP_NAME}-{name}");

    match thread::Builder::new().name(thread_name.clone()).spawn(task) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
            None
        }
    }
}

// ============================================================================
// UI Dispatch
// ============================================================================

/// A unit of work to run on the UI thread against its owned state.
pub type UiTask<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

/// Receiving end of the UI dispatch queue. Owned by the UI thread.
pub struct UiQueue<T> {
    sender: mpsc::UnboundedSender<UiTask<T>>,
    receiver: mpsc::UnboundedReceiver<UiTask<T>>,
}

/// Cloneable handle for posting work onto the UI thread.
pub struct UiSender<T> {
    sender: mpsc::UnboundedSender<UiTask<T>>,
}

impl<T> Clone for UiSender<T> {
    fn clone(&self) -> Self { Self { sender: self.sender.clone() } }
}

impl<T> std::fmt::Debug for UiSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiSender").field("closed", &self.sender.is_closed()).finish()
    }
}

impl<T> Default for UiQueue<T> {
    fn default() -> Self { Self::new() }
}

impl<T> UiQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Returns a sender that posts onto this queue.
    #[must_use]
    pub fn sender(&self) -> UiSender<T> { UiSender { sender: self.sender.clone() } }

    /// Runs every task currently queued against `target`.
    ///
    /// Returns the number of tasks run.
    pub fn drain(&mut self, target: &mut T) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task(target);
            count += 1;
        }
        count
    }

    /// Drains repeatedly until `done` returns true or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied.
    pub fn drain_until<F>(&mut self, target: &mut T, timeout: Duration, mut done: F) -> bool
    where F: FnMut(&T) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.drain(target);
            if done(target) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl<T> UiSender<T> {
    /// Posts a task to the UI thread.
    ///
    /// Returns `false` if the UI queue is gone; the task is dropped.
    pub fn post<F>(&self, task: F) -> bool
    where F: FnOnce(&mut T) + Send + 'static {
        self.sender.send(Box::new(task)).is_ok()
    }
}

// ============================================================================
// Repeating Timer
// ============================================================================

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

/// A background thread that runs a callback at a fixed interval until it is
/// stopped or dropped.
pub struct RepeatingTask {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawns the timer thread. The first tick happens after one interval.
    ///
    /// Returns `None` if the thread could not be spawned.
    pub fn spawn<F>(name: &str, interval: Duration, mut tick: F) -> Option<Self>
    where F: FnMut() + Send + 'static {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = spawn_named_thread(name, move || {
            loop {
                let mut stopped = thread_signal.stopped.lock();
                if !*stopped {
                    thread_signal.condvar.wait_for(&mut stopped, interval);
                }
                if *stopped {
                    return;
                }
                drop(stopped);
                tick();
            }
        })?;

        Some(Self { signal, handle: Some(handle) })
    }

    /// Stops the timer and waits for its thread to exit.
    pub fn stop(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.condvar.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Returns whether the timer is still running.
    #[must_use]
    pub fn is_running(&self) -> bool { self.handle.is_some() && !*self.signal.stopped.lock() }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) { self.stop(); }
}
