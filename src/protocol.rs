//! Line protocol
//!
//! JSON-based protocol used by the `ansi-cursor` binary. Callers send one
//! command per line and get either raw escape bytes (encode mode) or one
//! response per line (decode and replay modes).
//!
//! Example:
//! ```json
//! {"cmd": "move_cursor", "x": 10, "y": 3}
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::core::Coordinate;
use crate::encoder::{Encoder, MouseMode};
use crate::input::Token;
use crate::replay::Sequence;

/// Commands from the caller to the encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Move to an absolute cell
    MoveCursor {
        x: usize,
        y: usize,
    },

    /// Change column only
    MoveCursorHorizontally {
        x: usize,
    },

    /// Change row only
    MoveCursorVertically {
        y: usize,
    },

    ShowCursor,
    HideCursor,
    SaveCursor,
    RestoreCursor,

    /// Enable mouse tracking
    EnableMouse {
        /// Mode: "normal" (press/release), "button" (+ drag), "any" (all motion), "sgr" (extended)
        #[serde(default = "default_mouse_mode")]
        mode: MouseMode,
    },

    /// Disable mouse tracking
    DisableMouse,

    /// Forget the tracked terminal state
    ResetState,
}

impl Command {
    /// Run the command against `encoder`, returning the bytes to transmit
    pub fn apply(&self, encoder: &mut Encoder) -> Bytes {
        match *self {
            Command::MoveCursor { x, y } => encoder.move_cursor(Coordinate { x, y }),
            Command::MoveCursorHorizontally { x } => encoder.move_cursor_horizontally(x),
            Command::MoveCursorVertically { y } => encoder.move_cursor_vertically(y),
            Command::ShowCursor => encoder.show_cursor(),
            Command::HideCursor => encoder.hide_cursor(),
            Command::SaveCursor => encoder.save_cursor(),
            Command::RestoreCursor => encoder.restore_cursor(),
            Command::EnableMouse { mode } => encoder.enable_mouse(mode),
            Command::DisableMouse => encoder.disable_mouse(),
            Command::ResetState => {
                encoder.reset_state();
                Bytes::new()
            }
        }
    }
}

/// Response lines written by the decode and replay modes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Decoded terminal input
    Token {
        token: Token,
    },

    /// Recognized encoder output
    Sequence {
        sequence: Sequence,
    },

    /// Final state of a replay
    Cursor {
        position: Coordinate,
        visible: bool,
    },
}

fn default_mouse_mode() -> MouseMode {
    MouseMode::Sgr
}

/// Parse a command from JSON
pub fn parse_command(json: &str) -> Result<Command, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a response to JSON
pub fn serialize_response(response: &Response) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}
