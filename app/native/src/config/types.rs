//! Configuration types for Fences.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! These values are the global defaults every fence falls back to when it
//! carries no per-fence override.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DOCUMENT_FILE_NAME, SHORTCUTS_DIR_NAME};
use crate::platform::path::expand;

/// Chrome tint applied to a fence window.
///
/// Serialized with the exact variant name, which is also the string stored
/// in a fence record's `CustomColor` field.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum FenceColor {
    #[default]
    Gray,
    Black,
    White,
    Beige,
    Green,
    Purple,
    Fuchsia,
    Yellow,
    Orange,
    Red,
    Blue,
    Bismark,
}

impl FenceColor {
    /// Every selectable color, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Gray,
        Self::Black,
        Self::White,
        Self::Beige,
        Self::Green,
        Self::Purple,
        Self::Fuchsia,
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::Blue,
        Self::Bismark,
    ];

    /// Returns the persisted name of this color.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "Gray",
            Self::Black => "Black",
            Self::White => "White",
            Self::Beige => "Beige",
            Self::Green => "Green",
            Self::Purple => "Purple",
            Self::Fuchsia => "Fuchsia",
            Self::Yellow => "Yellow",
            Self::Orange => "Orange",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Bismark => "Bismark",
        }
    }

    /// Returns the base RGB hex value used for the window tint.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Gray => "#6E6E6E",
            Self::Black => "#1E1E1E",
            Self::White => "#F0F0F0",
            Self::Beige => "#D8C9A8",
            Self::Green => "#3C8C4A",
            Self::Purple => "#6A3D9A",
            Self::Fuchsia => "#C2188A",
            Self::Yellow => "#D9B526",
            Self::Orange => "#E07A1F",
            Self::Red => "#B3261E",
            Self::Blue => "#1F5FB3",
            Self::Bismark => "#4A6C82",
        }
    }

    /// Parses a color name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|color| color.as_str().eq_ignore_ascii_case(value))
    }
}

/// Animation played on an icon when its item is launched.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum LaunchEffect {
    #[default]
    Zoom,
    Bounce,
    FadeOut,
    SlideUp,
    Rotate,
    Agitate,
    GrowAndFly,
    Pulse,
    Elastic,
    Flip3D,
    Spiral,
    Shockwave,
    Matrix,
    Supernova,
    Teleport,
}

impl LaunchEffect {
    /// Every selectable effect, in menu order.
    pub const ALL: [Self; 15] = [
        Self::Zoom,
        Self::Bounce,
        Self::FadeOut,
        Self::SlideUp,
        Self::Rotate,
        Self::Agitate,
        Self::GrowAndFly,
        Self::Pulse,
        Self::Elastic,
        Self::Flip3D,
        Self::Spiral,
        Self::Shockwave,
        Self::Matrix,
        Self::Supernova,
        Self::Teleport,
    ];

    /// Returns the persisted name of this effect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zoom => "Zoom",
            Self::Bounce => "Bounce",
            Self::FadeOut => "FadeOut",
            Self::SlideUp => "SlideUp",
            Self::Rotate => "Rotate",
            Self::Agitate => "Agitate",
            Self::GrowAndFly => "GrowAndFly",
            Self::Pulse => "Pulse",
            Self::Elastic => "Elastic",
            Self::Flip3D => "Flip3D",
            Self::Spiral => "Spiral",
            Self::Shockwave => "Shockwave",
            Self::Matrix => "Matrix",
            Self::Supernova => "Supernova",
            Self::Teleport => "Teleport",
        }
    }

    /// Parses an effect name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|effect| effect.as_str().eq_ignore_ascii_case(value))
    }
}

/// Minimum severity written to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the `tracing` filter directive for this level.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log categories that can be switched on and off independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LogCategory {
    /// Startup, shutdown and anything without a better home.
    General,
    /// Fence creation, deletion and window construction.
    Creation,
    /// Property updates flowing through the update pipeline.
    Update,
    /// Gesture handling, animations and window visuals.
    Ui,
    /// Item icons, target polling and shortcut handling.
    Icons,
    /// Schema migration of the fence document.
    Migration,
    /// Configuration loading.
    Settings,
    /// Timing information.
    Performance,
}

impl LogCategory {
    /// Every category.
    pub const ALL: [Self; 8] = [
        Self::General,
        Self::Creation,
        Self::Update,
        Self::Ui,
        Self::Icons,
        Self::Migration,
        Self::Settings,
        Self::Performance,
    ];

    /// Returns the `tracing` target used for events in this category.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::General => crate::logging::GENERAL,
            Self::Creation => crate::logging::CREATION,
            Self::Update => crate::logging::UPDATE,
            Self::Ui => crate::logging::UI,
            Self::Icons => crate::logging::ICONS,
            Self::Migration => crate::logging::MIGRATION,
            Self::Settings => crate::logging::SETTINGS,
            Self::Performance => crate::logging::PERFORMANCE,
        }
    }
}

/// Global appearance defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AppearanceConfig {
    /// Accent color used by fences without a `CustomColor`.
    /// Default: "Gray"
    pub accent_color: FenceColor,

    /// Background tint opacity in percent (0-100).
    /// Default: 60
    pub tint_level: u8,

    /// Launch effect used by fences without a `CustomLaunchEffect`.
    /// Default: "Zoom"
    pub launch_effect: LaunchEffect,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            accent_color: FenceColor::Gray,
            tint_level: 60,
            launch_effect: LaunchEffect::Zoom,
        }
    }
}

impl AppearanceConfig {
    /// Returns the tint level clamped to a valid percentage.
    #[must_use]
    pub fn tint_percent(&self) -> u8 { self.tint_level.min(100) }
}

/// Global behavior defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorConfig {
    /// Snap fences to screen edges and to each other when a drag ends.
    /// Default: true
    pub snap_enabled: bool,

    /// Distance in device-independent units within which snapping applies.
    /// Default: 10
    pub snap_threshold: f64,

    /// Launch items with a single click instead of a double click.
    /// Default: true
    pub single_click_to_launch: bool,

    /// Poll network (UNC) targets for existence. Off by default because
    /// unreachable shares make every poll slow.
    /// Default: false
    pub check_network_paths: bool,

    /// Interval between target existence checks, in milliseconds.
    /// Default: 2000
    pub poll_interval_ms: u64,

    /// Duration of the roll-up / roll-down animation, in milliseconds.
    /// Default: 300
    pub roll_duration_ms: u64,

    /// Interval of the transition guard watchdog, in seconds.
    /// Default: 10
    pub watchdog_interval_secs: u64,

    /// How long "peek behind" keeps fences hidden, in seconds.
    /// Default: 10
    pub peek_duration_secs: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            snap_threshold: 10.0,
            single_click_to_launch: true,
            check_network_paths: false,
            poll_interval_ms: 2000,
            roll_duration_ms: 300,
            watchdog_interval_secs: 10,
            peek_duration_secs: 10,
        }
    }
}

impl BehaviorConfig {
    /// Returns the roll animation duration.
    #[must_use]
    pub const fn roll_duration(&self) -> Duration { Duration::from_millis(self.roll_duration_ms) }

    /// Returns the target poll interval, never shorter than 100ms.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    /// Returns the watchdog interval, never shorter than one second.
    #[must_use]
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs.max(1))
    }

    /// Returns how long peek-behind lasts.
    #[must_use]
    pub const fn peek_duration(&self) -> Duration { Duration::from_secs(self.peek_duration_secs) }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Minimum level written to the log.
    /// Default: "info"
    pub level: LogLevel,

    /// Categories that are written. Events in other categories are dropped.
    /// Default: all categories
    pub categories: Vec<LogCategory>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            categories: LogCategory::ALL.to_vec(),
        }
    }
}

impl LoggingConfig {
    /// Returns whether a category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: LogCategory) -> bool { self.categories.contains(&category) }
}

/// Root configuration for Fences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FencesConfig {
    /// Appearance defaults.
    pub appearance: AppearanceConfig,

    /// Behavior defaults.
    pub behavior: BehaviorConfig,

    /// Logging options.
    pub logging: LoggingConfig,

    /// Directory holding `fences.json` and generated shortcuts.
    /// Supports `~`. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl FencesConfig {
    /// Returns the directory holding the fence document.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        match self.data_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => expand(dir),
            _ => dirs::data_dir().map_or_else(
                || std::env::temp_dir().join(APP_NAME),
                |data| data.join(APP_NAME),
            ),
        }
    }

    /// Returns the path of the persisted fence document.
    #[must_use]
    pub fn document_path(&self) -> PathBuf { self.data_dir().join(DOCUMENT_FILE_NAME) }

    /// Returns the managed folder generated shortcuts are written to.
    #[must_use]
    pub fn shortcuts_dir(&self) -> PathBuf { self.data_dir().join(SHORTCUTS_DIR_NAME) }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error("No configuration file found")]
    NotFound,
    /// An I/O error occurred while reading the configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration file names, in priority order.
const CONFIG_FILE_NAMES: [&str; 2] = ["config.jsonc", "config.json"];

/// Legacy configuration file names in the home directory.
const LEGACY_CONFIG_FILE_NAMES: [&str; 2] = [".fences.jsonc", ".fences.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/fences/config.jsonc` when the variable is set
/// 2. `~/.config/fences/config.jsonc` or `config.json`
/// 3. The platform config directory (`dirs::config_dir()`)
/// 4. `~/.fences.jsonc` or `~/.fences.json` (legacy/simple location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let app_dir = PathBuf::from(xdg_config).join(APP_NAME);
        for filename in CONFIG_FILE_NAMES {
            paths.push(app_dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let app_dir = home.join(".config").join(APP_NAME);
        for filename in CONFIG_FILE_NAMES {
            let path = app_dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join(APP_NAME);
        for filename in CONFIG_FILE_NAMES {
            let path = app_dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &PathBuf) -> Result<(FencesConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let config = parse_config_file(path)?;
    Ok((config, path.clone()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(FencesConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = parse_config_file(&path)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}

fn parse_config_file(path: &Path) -> Result<FencesConfig, ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FencesConfig::default();
        assert_eq!(config.appearance.accent_color, FenceColor::Gray);
        assert_eq!(config.appearance.launch_effect, LaunchEffect::Zoom);
        assert!(config.behavior.snap_enabled);
        assert!(!config.behavior.check_network_paths);
        assert_eq!(config.behavior.roll_duration(), Duration::from_millis(300));
        assert_eq!(config.behavior.watchdog_interval(), Duration::from_secs(10));
        assert_eq!(config.logging.categories.len(), LogCategory::ALL.len());
    }

    #[test]
    fn test_config_deserializes_partial_jsonc() {
        let json = r#"{
            // accent override
            "appearance": { "accentColor": "Blue" },
            "behavior": { "checkNetworkPaths": true, "rollDurationMs": 150 },
            "logging": { "level": "debug", "categories": ["update", "ui"] }
        }"#;
        let reader = json_comments::StripComments::new(json.as_bytes());
        let config: FencesConfig = serde_json::from_reader(reader).unwrap();

        assert_eq!(config.appearance.accent_color, FenceColor::Blue);
        assert_eq!(config.appearance.tint_level, 60);
        assert!(config.behavior.check_network_paths);
        assert_eq!(config.behavior.roll_duration_ms, 150);
        assert!(config.behavior.snap_enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.is_enabled(LogCategory::Update));
        assert!(!config.logging.is_enabled(LogCategory::Migration));
    }

    #[test]
    fn test_fence_color_parse_is_case_insensitive() {
        assert_eq!(FenceColor::parse("bismark"), Some(FenceColor::Bismark));
        assert_eq!(FenceColor::parse(" RED "), Some(FenceColor::Red));
        assert_eq!(FenceColor::parse("Chartreuse"), None);
    }

    #[test]
    fn test_launch_effect_parse() {
        assert_eq!(LaunchEffect::parse("flip3d"), Some(LaunchEffect::Flip3D));
        assert_eq!(LaunchEffect::parse("Explode"), None);
    }

    #[test]
    fn test_data_dir_override_is_expanded() {
        let config = FencesConfig {
            data_dir: Some("/var/lib/fences".to_string()),
            ..Default::default()
        };
        assert_eq!(config.document_path(), PathBuf::from("/var/lib/fences/fences.json"));
        assert_eq!(config.shortcuts_dir(), PathBuf::from("/var/lib/fences/Shortcuts"));
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let behavior = BehaviorConfig { poll_interval_ms: 5, ..Default::default() };
        assert_eq!(behavior.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let result = load_config_from_path(&PathBuf::from("/nonexistent/fences/config.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }
}
