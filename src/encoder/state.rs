//! Terminal state tracker
//!
//! What the encoder believes about the remote terminal. Everything starts
//! unknown and becomes known only through sequences the encoder itself has
//! issued; nothing here is ever inferred from terminal input.

use serde::{Deserialize, Serialize};

use super::MouseMode;
use crate::core::Coordinate;

/// Believed cursor position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CursorPosition {
    #[default]
    Unknown,
    Known(Coordinate),
}

impl CursorPosition {
    pub fn known(&self) -> Option<Coordinate> {
        match self {
            CursorPosition::Unknown => None,
            CursorPosition::Known(pos) => Some(*pos),
        }
    }
}

impl From<Option<Coordinate>> for CursorPosition {
    fn from(pos: Option<Coordinate>) -> Self {
        pos.map_or(CursorPosition::Unknown, CursorPosition::Known)
    }
}

/// Believed cursor visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorVisibility {
    #[default]
    Unknown,
    Shown,
    Hidden,
}

/// Believed mouse reporting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "mode", rename_all = "snake_case")]
pub enum MouseTracking {
    #[default]
    Unknown,
    Disabled,
    Enabled(MouseMode),
}

/// Everything the encoder tracks for one connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalState {
    pub cursor_position: CursorPosition,
    pub cursor_visibility: CursorVisibility,
    /// Position captured by the last `CSI s`, if it was known at the time
    pub saved_cursor_position: Option<Coordinate>,
    pub mouse: MouseTracking,
}

impl TerminalState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unknown() {
        let state = TerminalState::new();
        assert_eq!(state.cursor_position, CursorPosition::Unknown);
        assert_eq!(state.cursor_visibility, CursorVisibility::Unknown);
        assert_eq!(state.saved_cursor_position, None);
        assert_eq!(state.mouse, MouseTracking::Unknown);
    }

    #[test]
    fn test_position_from_option() {
        let pos = Coordinate::new(4, 2);
        assert_eq!(CursorPosition::from(Some(pos)), CursorPosition::Known(pos));
        assert_eq!(CursorPosition::from(None), CursorPosition::Unknown);
        assert_eq!(CursorPosition::Known(pos).known(), Some(pos));
    }

    #[test]
    fn test_state_json() {
        let state = TerminalState {
            cursor_position: CursorPosition::Known(Coordinate::new(1, 2)),
            ..TerminalState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["cursor_position"]["state"], "known");
        assert_eq!(json["cursor_position"]["x"], 1);
        assert_eq!(json["cursor_visibility"], "unknown");
        assert_eq!(json["mouse"]["state"], "unknown");
    }
}
