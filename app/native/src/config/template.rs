//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Fences Configuration File
// ==========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Appearance defaults (used when a fence has no override of its own)
  // ============================================================================
  // "appearance": {
  //   // Gray, Black, White, Beige, Green, Purple, Fuchsia, Yellow,
  //   // Orange, Red, Blue, Bismark
  //   "accentColor": "Gray",
  //
  //   // Background tint opacity in percent (0-100)
  //   "tintLevel": 60,
  //
  //   // Zoom, Bounce, FadeOut, SlideUp, Rotate, Agitate, GrowAndFly, Pulse,
  //   // Elastic, Flip3D, Spiral, Shockwave, Matrix, Supernova, Teleport
  //   "launchEffect": "Zoom"
  // },

  // ============================================================================
  // Behavior
  // ============================================================================
  // "behavior": {
  //   // Snap fences to screen edges and other fences when a drag ends
  //   "snapEnabled": true,
  //   "snapThreshold": 10,
  //
  //   // Launch items with a single click (false = double click)
  //   "singleClickToLaunch": true,
  //
  //   // Poll network (UNC) shortcut targets for existence
  //   "checkNetworkPaths": false,
  //
  //   // Interval between target existence checks in milliseconds
  //   "pollIntervalMs": 2000,
  //
  //   // Roll-up / roll-down animation duration in milliseconds
  //   "rollDurationMs": 300,
  //
  //   // Transition guard watchdog interval in seconds
  //   "watchdogIntervalSecs": 10,
  //
  //   // How long "peek behind" hides fences, in seconds
  //   "peekDurationSecs": 10
  // },

  // ============================================================================
  // Logging
  // ============================================================================
  // "logging": {
  //   // debug, info, warn, error
  //   "level": "info",
  //
  //   // general, creation, update, ui, icons, migration, settings, performance
  //   "categories": ["general", "creation", "update", "ui", "icons", "migration", "settings", "performance"]
  // },

  // Directory holding fences.json and generated shortcuts
  // "dataDir": "~/.local/share/fences"
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
