//! Application-wide constants.

/// Application name, used for config/data directory names and thread names.
pub const APP_NAME: &str = "fences";

/// File name of the persisted fence document inside the data directory.
pub const DOCUMENT_FILE_NAME: &str = "fences.json";

/// Managed subfolder (inside the data directory) holding generated shortcuts.
pub const SHORTCUTS_DIR_NAME: &str = "Shortcuts";

/// Height of a rolled-up fence: the title strip only.
pub const COLLAPSED_HEIGHT: f64 = 26.0;

/// Minimum distance from [`COLLAPSED_HEIGHT`] for a height to count as an
/// expanded height worth remembering.
pub const UNROLLED_HEIGHT_MARGIN: f64 = 10.0;

/// Fallback height restored when a record has no usable height.
pub const DEFAULT_FENCE_HEIGHT: f64 = 130.0;

/// Width of newly created fences.
pub const DEFAULT_FENCE_WIDTH: f64 = 230.0;

/// Title given to newly created fences.
pub const DEFAULT_FENCE_TITLE: &str = "New Fence";

/// Narrowest width a fence can be resized to.
pub const MIN_FENCE_WIDTH: f64 = 80.0;
