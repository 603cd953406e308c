//! Output replay
//!
//! Parses the escape sequences the encoder produces and applies them to a
//! modeled cursor, the way a terminal would. There is no screen buffer:
//! only cursor position, visibility, the saved position and mouse modes are
//! followed. Anything outside that grammar is skipped.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::Coordinate;

/// One recognized control sequence, with arguments already defaulted
/// and converted to zero-based positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Sequence {
    /// CUP
    CursorPosition { x: usize, y: usize },
    /// CHA
    HorizontalAbsolute { x: usize },
    /// VPA
    VerticalAbsolute { y: usize },
    Up { n: usize },
    Down { n: usize },
    Right { n: usize },
    Left { n: usize },
    ShowCursor,
    HideCursor,
    SaveCursor,
    RestoreCursor,
    PrivateMode { mode: u16, enabled: bool },
    /// Printable text (one character)
    Text { char: char },
}

/// Parser state machine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum ParserState {
    /// Normal text input
    #[default]
    Normal,
    /// Got ESC, waiting for next char
    Escape,
    /// Got ESC [, reading CSI sequence
    Csi,
}

/// Cursor model driven by encoder output
#[derive(Debug, Clone, Default)]
pub struct CursorReplay {
    /// Cursor position
    pub cursor: Coordinate,
    pub cursor_visible: bool,
    /// Saved cursor position (for CSI s / CSI u)
    pub saved_cursor: Option<Coordinate>,
    /// DEC private modes currently set
    pub private_modes: BTreeSet<u16>,
    parser_state: ParserState,
    /// Escape sequence buffer
    esc_buffer: String,
}

impl CursorReplay {
    /// Start from a cursor at `cursor`, shown
    pub fn new(cursor: Coordinate) -> Self {
        Self {
            cursor,
            cursor_visible: true,
            ..Self::default()
        }
    }

    /// Process encoder output, returning the sequences recognized in order
    pub fn process(&mut self, data: &[u8]) -> Vec<Sequence> {
        let mut sequences = Vec::new();
        for &byte in data {
            if let Some(seq) = self.process_byte(byte) {
                self.apply(seq);
                sequences.push(seq);
            }
        }
        sequences
    }

    /// Process a single byte
    fn process_byte(&mut self, byte: u8) -> Option<Sequence> {
        match self.parser_state {
            ParserState::Normal => match byte {
                0x1b => {
                    self.parser_state = ParserState::Escape;
                    self.esc_buffer.clear();
                    None
                }
                0x20..=0x7e => Some(Sequence::Text { char: char::from(byte) }),
                _ => None,
            },
            ParserState::Escape => {
                if byte == b'[' {
                    self.parser_state = ParserState::Csi;
                    self.esc_buffer.clear();
                } else {
                    self.parser_state = ParserState::Normal;
                }
                None
            }
            ParserState::Csi => {
                if (0x40..=0x7e).contains(&byte) {
                    self.parser_state = ParserState::Normal;
                    self.parse_csi(byte)
                } else {
                    self.esc_buffer.push(char::from(byte));
                    None
                }
            }
        }
    }

    /// Decode a complete CSI sequence
    fn parse_csi(&self, final_byte: u8) -> Option<Sequence> {
        if let Some(modes) = self.esc_buffer.strip_prefix('?') {
            let mode: u16 = modes.parse().ok()?;
            return match (mode, final_byte) {
                (25, b'h') => Some(Sequence::ShowCursor),
                (25, b'l') => Some(Sequence::HideCursor),
                (_, b'h') => Some(Sequence::PrivateMode { mode, enabled: true }),
                (_, b'l') => Some(Sequence::PrivateMode { mode, enabled: false }),
                _ => None,
            };
        }

        let params: Vec<usize> = self.esc_buffer
            .split(';')
            .map(|s| s.parse().unwrap_or(0))
            .collect();
        // Missing and zero arguments both mean 1
        let param = |i: usize| params.get(i).copied().unwrap_or(1).max(1);

        Some(match final_byte {
            b'A' => Sequence::Up { n: param(0) },
            b'B' => Sequence::Down { n: param(0) },
            b'C' => Sequence::Right { n: param(0) },
            b'D' => Sequence::Left { n: param(0) },
            b'G' => Sequence::HorizontalAbsolute { x: param(0) - 1 },
            b'd' => Sequence::VerticalAbsolute { y: param(0) - 1 },
            b'H' | b'f' => Sequence::CursorPosition { x: param(1) - 1, y: param(0) - 1 },
            b's' => Sequence::SaveCursor,
            b'u' => Sequence::RestoreCursor,
            _ => return None,
        })
    }

    fn apply(&mut self, seq: Sequence) {
        let cursor = &mut self.cursor;
        match seq {
            Sequence::CursorPosition { x, y } => *cursor = Coordinate { x, y },
            Sequence::HorizontalAbsolute { x } => cursor.x = x,
            Sequence::VerticalAbsolute { y } => cursor.y = y,
            Sequence::Up { n } => cursor.y = cursor.y.saturating_sub(n),
            Sequence::Down { n } => cursor.y = cursor.y.saturating_add(n),
            Sequence::Right { n } => cursor.x = cursor.x.saturating_add(n),
            Sequence::Left { n } => cursor.x = cursor.x.saturating_sub(n),
            Sequence::ShowCursor => self.cursor_visible = true,
            Sequence::HideCursor => self.cursor_visible = false,
            Sequence::SaveCursor => self.saved_cursor = Some(*cursor),
            Sequence::RestoreCursor => {
                if let Some(saved) = self.saved_cursor {
                    *cursor = saved;
                }
            }
            Sequence::PrivateMode { mode, enabled: true } => {
                self.private_modes.insert(mode);
            }
            Sequence::PrivateMode { mode, enabled: false } => {
                self.private_modes.remove(&mode);
            }
            Sequence::Text { .. } => cursor.x = cursor.x.saturating_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::encoder::{Encoder, MouseMode};

    fn at(x: usize, y: usize) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_parse_cursor_sequences() {
        let mut replay = CursorReplay::new(at(5, 5));
        let seqs = replay.process(b"\x1b[3;3H\x1b[G\x1b[8d\x1b[2A\x1b[C");
        assert_eq!(
            seqs,
            vec![
                Sequence::CursorPosition { x: 2, y: 2 },
                Sequence::HorizontalAbsolute { x: 0 },
                Sequence::VerticalAbsolute { y: 7 },
                Sequence::Up { n: 2 },
                Sequence::Right { n: 1 },
            ]
        );
        assert_eq!(replay.cursor, at(1, 5));
    }

    #[test]
    fn test_cursor_position_defaults() {
        let mut replay = CursorReplay::new(at(5, 5));
        assert_eq!(replay.process(b"\x1b[H"), vec![Sequence::CursorPosition { x: 0, y: 0 }]);
        assert_eq!(replay.process(b"\x1b[4H"), vec![Sequence::CursorPosition { x: 0, y: 3 }]);
    }

    #[test]
    fn test_ignores_other_sequences() {
        let mut replay = CursorReplay::new(at(0, 0));
        assert!(replay.process(b"\x1b[2J\x1b[0m\x1b7").is_empty());
        assert_eq!(replay.cursor, at(0, 0));
    }

    #[test]
    fn test_visibility_and_modes() {
        let mut replay = CursorReplay::new(at(0, 0));
        replay.process(b"\x1b[?25l\x1b[?1006h\x1b[?1002h\x1b[?1006l");
        assert!(!replay.cursor_visible);
        assert_eq!(replay.private_modes.iter().copied().collect::<Vec<_>>(), vec![1002]);
    }

    #[test]
    fn test_huge_counts_clamp() {
        let mut replay = CursorReplay::new(at(2, 2));
        let input = format!("\x1b[{0}B\x1b[{0}Cx", usize::MAX);
        replay.process(input.as_bytes());
        assert_eq!(replay.cursor, at(usize::MAX, usize::MAX));
    }

    #[test]
    fn test_save_restore() {
        let mut replay = CursorReplay::new(at(4, 4));
        replay.process(b"\x1b[s\x1b[10;10H\x1b[u");
        assert_eq!(replay.cursor, at(4, 4));
    }

    /// Drive the encoder through a path and check that replaying its output
    /// puts the modeled cursor exactly where the encoder believes it is.
    fn follow(capabilities: Capabilities, path: &[Coordinate]) {
        let mut encoder = Encoder::new(capabilities);
        let mut replay = CursorReplay::new(at(37, 19));

        for &target in path {
            let bytes = encoder.move_cursor(target);
            replay.process(&bytes);
            assert_eq!(replay.cursor, target, "after {:?} ({:?})", target, bytes);
        }
    }

    #[test]
    fn test_encoder_output_replays_to_target() {
        let path = [
            at(2, 2),
            at(0, 2),
            at(9, 2),
            at(9, 14),
            at(9, 13),
            at(120, 13),
            at(3, 13),
            at(3, 0),
            at(0, 0),
            at(999, 0),
            at(0, 0),
            at(0, 150),
            at(44, 7),
        ];
        follow(Capabilities::all(), &path);
        follow(Capabilities::relative_only(), &path);
        follow(
            Capabilities { horizontal_absolute_default: false, ..Capabilities::all() },
            &path,
        );
    }

    #[test]
    fn test_single_axis_moves_replay() {
        let mut encoder = Encoder::default();
        let mut replay = CursorReplay::new(at(3, 8));

        replay.process(&encoder.move_cursor_horizontally(12));
        assert_eq!(replay.cursor.x, 12);
        replay.process(&encoder.move_cursor_vertically(1));
        assert_eq!(replay.cursor.y, 1);

        replay.process(&encoder.move_cursor(at(6, 6)));
        replay.process(&encoder.move_cursor_vertically(20));
        replay.process(&encoder.move_cursor_horizontally(2));
        assert_eq!(replay.cursor, at(2, 20));
    }

    #[test]
    fn test_sequences_carry_operation_parameters() {
        let mut encoder = Encoder::default();
        let mut replay = CursorReplay::new(at(0, 0));

        let seqs = replay.process(&encoder.move_cursor(at(11, 4)));
        assert_eq!(seqs, vec![Sequence::CursorPosition { x: 11, y: 4 }]);

        let seqs = replay.process(&encoder.move_cursor(at(11, 1)));
        assert_eq!(seqs, vec![Sequence::Up { n: 3 }]);

        let seqs = replay.process(&encoder.move_cursor(at(0, 1)));
        assert_eq!(seqs, vec![Sequence::HorizontalAbsolute { x: 0 }]);
    }

    #[test]
    fn test_relative_motion_reads_back_as_cursor_keys() {
        use crate::input::{Decoder, Token, VirtualKey};

        let mut encoder = Encoder::new(Capabilities::relative_only());
        let mut decoder = Decoder::new();
        encoder.move_cursor(at(5, 5));

        let moves = [
            (at(5, 4), VirtualKey::Up),
            (at(5, 5), VirtualKey::Down),
            (at(6, 5), VirtualKey::Right),
            (at(5, 5), VirtualKey::Left),
        ];
        for (target, expected) in moves {
            let tokens = decoder.parse(&encoder.move_cursor(target));
            assert!(
                matches!(tokens.as_slice(), [Token::Key { key, .. }] if *key == expected),
                "{:?} decoded as {:?}",
                target,
                tokens
            );
        }
    }

    #[test]
    fn test_encoder_state_replays() {
        let mut encoder = Encoder::default();
        let mut replay = CursorReplay::new(at(0, 0));

        replay.process(&encoder.move_cursor(at(7, 7)));
        replay.process(&encoder.save_cursor());
        replay.process(&encoder.move_cursor(at(1, 2)));
        replay.process(&encoder.hide_cursor());
        replay.process(&encoder.enable_mouse(MouseMode::Sgr));
        replay.process(&encoder.restore_cursor());

        assert_eq!(replay.cursor, at(7, 7));
        assert!(!replay.cursor_visible);
        assert_eq!(replay.private_modes.iter().copied().collect::<Vec<_>>(), vec![1002, 1006]);

        replay.process(&encoder.disable_mouse());
        assert!(replay.private_modes.is_empty());
    }
}
