//! The fence state engine.
//!
//! - [`state`] - Records, the JSON document, and shared geometry
//! - [`migration`] - Schema repair applied on every load
//! - [`animation`] - The roll state machine and its easing
//! - [`guard`] - Fences mid-transition
//! - [`window`] - Per-fence window controller, chrome, and menus
//! - [`manager`] - The owner of records and windows; event handling
//! - [`bounds`] - Work-area clamping and snapping
//! - [`poller`] - Target existence polling
//! - [`portal`] - Folder mirrors for Portal fences
//! - [`shortcuts`] - Shortcut files for Data fence items
//! - [`hidden`] - The hidden-fence registry
//! - [`host`] - Collaborator traits and their headless implementations

pub mod animation;
pub mod bounds;
pub mod guard;
pub mod hidden;
pub mod host;
pub mod manager;
pub mod migration;
pub mod poller;
pub mod portal;
pub mod shortcuts;
pub mod state;
pub mod window;

pub use manager::{FenceEvent, FenceManager, FenceProperty, Services, UpdateOutcome};
