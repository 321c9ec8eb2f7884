//! Shared types for CLI commands.

use std::str::FromStr;

use clap::ValueEnum;

use crate::modules::fences::state::ItemsType;

/// Fence kind accepted by `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliFenceKind {
    /// Shortcut container.
    Data,
    /// Live view of a folder.
    Portal,
    /// Free-text note.
    Note,
}

impl From<CliFenceKind> for ItemsType {
    fn from(kind: CliFenceKind) -> Self {
        match kind {
            CliFenceKind::Data => Self::Data,
            CliFenceKind::Portal => Self::Portal,
            CliFenceKind::Note => Self::Note,
        }
    }
}

/// Target state for boolean fence toggles (`roll`, `lock`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
    /// Flip the current value.
    #[default]
    Toggle,
}

impl Switch {
    /// Resolves the switch against the current value.
    #[must_use]
    pub const fn apply(self, current: bool) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Toggle => !current,
        }
    }
}

/// A screen position in device-independent pixels, written `X,Y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self { Self { x: 100.0, y: 100.0 } }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid position: {s}. Expected X,Y (e.g. 100,200)");
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse::<f64>().map_err(|_| invalid())?;
        let y = y.trim().parse::<f64>().map_err(|_| invalid())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(invalid());
        }
        Ok(Self { x, y })
    }
}
