//! Escape-sequence encoder
//!
//! Turns cursor operations into the cheapest byte sequence the connected
//! terminal understands. Each operation consults the [`Capabilities`] and the
//! [`TerminalState`] it has built up so far, emits bytes (possibly none) and
//! records the expected effect on the terminal.
//!
//! Cost is the rendered byte count. Ties are broken as follows:
//! - a single-axis move beats CUP,
//! - moving left, CUB beats CHA; moving right, CHA beats CUF,
//! - moving vertically, CUU/CUD beat VPA.
//!
//! Operations must be applied in order: every choice depends on the state
//! left behind by the previous one.

pub mod csi;
pub mod state;

use bytes::{Bytes, BytesMut};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::core::Coordinate;
use csi::Csi;
pub use state::{CursorPosition, CursorVisibility, MouseTracking, TerminalState};

/// Mouse tracking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseMode {
    /// Normal tracking - press and release
    Normal,
    /// Button event tracking - press, release, and drag
    Button,
    /// Any event tracking - all motion
    Any,
    /// SGR extended mode (better for large screens)
    Sgr,
}

/// Cursor-control encoder for one terminal connection
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    capabilities: Capabilities,
    state: TerminalState,
}

impl Encoder {
    /// Create an encoder for a terminal with the given capabilities
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            state: TerminalState::new(),
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// What the encoder currently believes about the terminal
    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    /// Forget everything, e.g. after writing output the encoder did not track
    pub fn reset_state(&mut self) {
        debug!("terminal state reset to unknown");
        self.state = TerminalState::new();
    }

    /// Move the cursor to `target`
    pub fn move_cursor(&mut self, target: Coordinate) -> Bytes {
        let current = match self.state.cursor_position {
            CursorPosition::Known(current) if current == target => return Bytes::new(),
            position => position.known(),
        };

        let absolute = Csi::CursorPosition { x: target.x, y: target.y };
        let seq = match current {
            _ if target.is_origin() => absolute,
            Some(current) if current.y == target.y => {
                cheapest(self.horizontal_motion(current.x, target.x), absolute)
            }
            Some(current) if current.x == target.x => {
                cheapest(self.vertical_motion(current.y, target.y), absolute)
            }
            _ => absolute,
        };

        self.state.cursor_position = CursorPosition::Known(target);
        emit(seq)
    }

    /// Move the cursor to column `x`, leaving the row alone
    pub fn move_cursor_horizontally(&mut self, x: usize) -> Bytes {
        match self.state.cursor_position {
            CursorPosition::Known(current) => self.move_cursor(Coordinate { x, ..current }),
            CursorPosition::Unknown => {
                // Row still unknown afterwards, so nothing becomes known.
                emit(Csi::HorizontalAbsolute {
                    x,
                    omit_default: self.capabilities.omits_horizontal_default(),
                })
            }
        }
    }

    /// Move the cursor to row `y`, leaving the column alone
    pub fn move_cursor_vertically(&mut self, y: usize) -> Bytes {
        match self.state.cursor_position {
            CursorPosition::Known(current) => self.move_cursor(Coordinate { y, ..current }),
            CursorPosition::Unknown => emit(Csi::VerticalAbsolute { y }),
        }
    }

    pub fn show_cursor(&mut self) -> Bytes {
        self.set_visibility(CursorVisibility::Shown, Csi::ShowCursor)
    }

    pub fn hide_cursor(&mut self) -> Bytes {
        self.set_visibility(CursorVisibility::Hidden, Csi::HideCursor)
    }

    /// Save the cursor position (`CSI s`)
    pub fn save_cursor(&mut self) -> Bytes {
        self.state.saved_cursor_position = self.state.cursor_position.known();
        emit(Csi::SaveCursor)
    }

    /// Restore the last saved cursor position (`CSI u`)
    pub fn restore_cursor(&mut self) -> Bytes {
        self.state.cursor_position = self.state.saved_cursor_position.into();
        emit(Csi::RestoreCursor)
    }

    /// Switch mouse reporting on in the given mode
    pub fn enable_mouse(&mut self, mode: MouseMode) -> Bytes {
        if self.state.mouse == MouseTracking::Enabled(mode) {
            return Bytes::new();
        }

        let mut buf = BytesMut::new();
        if self.state.mouse != MouseTracking::Disabled {
            // Leftover modes from a previous setting would stack with the new one.
            write_all_mouse_modes_off(&mut buf);
        }
        for &private in csi::mouse_modes(mode) {
            Csi::PrivateMode { mode: private, enabled: true }.write(&mut buf);
        }

        debug!("mouse tracking enabled: {:?}", mode);
        self.state.mouse = MouseTracking::Enabled(mode);
        buf.freeze()
    }

    /// Switch every mouse reporting mode off
    pub fn disable_mouse(&mut self) -> Bytes {
        if self.state.mouse == MouseTracking::Disabled {
            return Bytes::new();
        }

        let mut buf = BytesMut::new();
        write_all_mouse_modes_off(&mut buf);

        self.state.mouse = MouseTracking::Disabled;
        buf.freeze()
    }

    fn set_visibility(&mut self, visibility: CursorVisibility, seq: Csi) -> Bytes {
        if self.state.cursor_visibility == visibility {
            return Bytes::new();
        }
        self.state.cursor_visibility = visibility;
        emit(seq)
    }

    /// Cheapest way to change column on a known row
    fn horizontal_motion(&self, from: usize, to: usize) -> Csi {
        let relative = if to < from {
            Csi::Left(from - to)
        } else {
            Csi::Right(to - from)
        };

        if !self.capabilities.horizontal_absolute {
            return relative;
        }

        let absolute = Csi::HorizontalAbsolute {
            x: to,
            omit_default: self.capabilities.horizontal_absolute_default,
        };
        let absolute_wins = if to < from {
            absolute.cost() < relative.cost()
        } else {
            absolute.cost() <= relative.cost()
        };

        if absolute_wins {
            absolute
        } else {
            relative
        }
    }

    /// Cheapest way to change row on a known column
    fn vertical_motion(&self, from: usize, to: usize) -> Csi {
        let relative = if to < from {
            Csi::Up(from - to)
        } else {
            Csi::Down(to - from)
        };

        if !self.capabilities.vertical_absolute {
            return relative;
        }

        cheapest(relative, Csi::VerticalAbsolute { y: to })
    }
}

/// `preferred` unless `other` is strictly shorter
fn cheapest(preferred: Csi, other: Csi) -> Csi {
    if other.cost() < preferred.cost() {
        other
    } else {
        preferred
    }
}

fn emit(seq: Csi) -> Bytes {
    trace!("emit {:?} ({} bytes)", seq, seq.cost());
    let mut buf = BytesMut::with_capacity(seq.cost());
    seq.write(&mut buf);
    buf.freeze()
}

fn write_all_mouse_modes_off(buf: &mut BytesMut) {
    for &private in &csi::ALL_MOUSE_MODES {
        Csi::PrivateMode { mode: private, enabled: false }.write(buf);
    }
}
