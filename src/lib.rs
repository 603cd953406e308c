//! ANSI cursor codec
//!
//! The protocol layer between a program and a character-cell terminal.
//!
//! # Overview
//!
//! - An encoder that turns cursor operations into the shortest escape
//!   sequence the terminal understands, tracking what it has already told
//!   the terminal
//! - A capability profile stating which optional sequences are usable
//! - A resumable decoder that turns raw terminal input (keys, mouse
//!   reports) into tokens, one byte at a time
//! - A replay model of encoder output, and a JSON line protocol for the
//!   `ansi-cursor` binary
//!
//! # Example
//!
//! ```
//! use ansi_cursor_codec::{Capabilities, Coordinate, Decoder, Encoder, Token, VirtualKey};
//!
//! let mut encoder = Encoder::new(Capabilities::default());
//! assert_eq!(encoder.move_cursor(Coordinate::new(2, 2)), &b"\x1b[3;3H"[..]);
//! assert_eq!(encoder.move_cursor(Coordinate::new(2, 3)), &b"\x1b[B"[..]);
//! assert!(encoder.move_cursor(Coordinate::new(2, 3)).is_empty());
//!
//! let mut decoder = Decoder::new();
//! let tokens = decoder.parse(b"\x1b[A");
//! assert!(matches!(tokens[0], Token::Key { key: VirtualKey::Up, .. }));
//! ```

pub mod capabilities;
pub mod core;
pub mod encoder;
pub mod input;
pub mod protocol;
pub mod replay;

// Re-export commonly used types
pub use capabilities::Capabilities;
pub use self::core::{Canvas, Coordinate};
pub use encoder::{CursorPosition, CursorVisibility, Encoder, MouseMode, MouseTracking, TerminalState};
pub use input::{Decoder, Modifiers, MouseAction, MouseButton, Token, VirtualKey};
pub use protocol::{Command, Response};
pub use replay::{CursorReplay, Sequence};
