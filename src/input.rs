//! Terminal input decoder
//!
//! Turns the raw byte stream a terminal sends into tokens.
//! Handles:
//! - Plain characters, CR/LF pairing (including telnet CR NUL)
//! - Cursor, editing and function keys (CSI and SS3 forms, xterm modifiers)
//! - Meta-prefixed keys (ESC + key)
//! - Mouse reports (X10 three-byte and SGR extended)
//!
//! The decoder consumes one byte at a time and keeps every partial sequence
//! in its own state, so input may be chunked arbitrarily by the transport.
//! Sequences it does not recognize are dropped without a token.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::core::Coordinate;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Offset added to every byte of an X10 mouse report
const MOUSE_OFFSET: u8 = 32;

/// Longest argument accepted before a sequence is abandoned
const MAX_ARGUMENT_LEN: usize = 32;

/// Most arguments accepted before a sequence is abandoned
const MAX_ARGUMENTS: usize = 16;

/// A decoded unit of terminal input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// A plain character
    Char { char: char },

    /// A key press
    Key { key: VirtualKey, modifiers: Modifiers },

    /// Mouse event
    Mouse {
        button: MouseButton,
        action: MouseAction,
        position: Coordinate,
        modifiers: Modifiers,
    },
}

impl Token {
    fn key(key: VirtualKey, modifiers: Modifiers) -> Self {
        Token::Key { key, modifiers }
    }
}

/// Keys that arrive as escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Escape,
    Enter,
    BackTab,
    Backspace,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    /// A printable character sent with the meta prefix
    Char(char),
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    None,  // Release reports and button-less motion
}

/// What happened to the button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseAction {
    Press,
    Release,
    Move,
}

/// Modifier keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };

    fn meta(meta: bool) -> Self {
        Self { meta, ..Self::NONE }
    }

    /// Decode the xterm modifier parameter (`CSI 1 ; n A`): n - 1 is a bitmask
    fn from_parameter(n: u32) -> Self {
        let bits = n.saturating_sub(1);
        Self {
            shift: bits & 0x01 != 0,
            alt: bits & 0x02 != 0,
            ctrl: bits & 0x04 != 0,
            meta: bits & 0x08 != 0,
        }
    }
}

/// Decoder states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    /// Got CR, waiting to see whether LF follows
    Cr,
    /// Got LF, a following CR belongs to it
    Lf,
    /// Got ESC
    Escape,
    /// Got ESC [ or ESC O, collecting arguments up to the final byte
    Arguments,
    /// Sequence rejected, swallowing bytes up to its final byte
    Discard,
    /// Got ESC [ M, reading the three report bytes
    MouseButton,
    MouseX,
    MouseY,
}

/// Result of one transition
#[derive(Debug)]
enum Step {
    /// Byte consumed, nothing complete yet
    Pending,
    /// Byte consumed, token complete
    Token(Token),
    /// Byte not consumed: emit the token (if any), then feed the byte again
    Reprocess(Option<Token>),
}

/// Resumable terminal input decoder
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: State,
    /// Byte that opened the current sequence: `[`, `O`, or a private marker
    initiator: u8,
    /// ESC ESC was seen
    meta: bool,
    /// Argument being collected
    argument: String,
    /// Completed arguments
    arguments: Vec<String>,
    mouse_button: u8,
    mouse_x: u32,
    mouse_y: u32,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Yields the tokens it completed: usually none or one,
    /// two when a pending CR is released by a following character.
    pub fn feed(&mut self, byte: u8) -> impl Iterator<Item = Token> {
        let mut tokens = [None, None];
        match self.step(byte) {
            Step::Pending => {}
            Step::Token(token) => tokens[0] = Some(token),
            Step::Reprocess(token) => {
                tokens[0] = token;
                if let Step::Token(token) = self.step(byte) {
                    tokens[1] = Some(token);
                }
            }
        }
        tokens.into_iter().flatten()
    }

    /// Feed a chunk of input and collect every completed token
    pub fn parse(&mut self, data: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        for &byte in data {
            tokens.extend(self.feed(byte));
        }
        tokens
    }

    /// Resolve a sequence that may never complete, for callers that give up
    /// waiting. A lone ESC becomes the Escape key and a lone CR a carriage
    /// return; any other partial sequence is dropped.
    pub fn flush(&mut self) -> Option<Token> {
        let token = match self.state {
            State::Cr => Some(Token::Char { char: '\r' }),
            State::Escape => Some(Token::key(VirtualKey::Escape, Modifiers::meta(self.meta))),
            State::Idle | State::Lf => None,
            _ => {
                debug!("dropping partial input sequence in {:?}", self.state);
                None
            }
        };
        self.reset();
        token
    }

    /// True when no partial sequence is pending
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle | State::Lf)
    }

    /// Drop any partial sequence
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.meta = false;
        self.argument.clear();
        self.arguments.clear();
    }

    fn step(&mut self, byte: u8) -> Step {
        trace!("{:?} <- {:#04x}", self.state, byte);
        match self.state {
            State::Idle => self.idle(byte),
            State::Cr => {
                self.state = State::Idle;
                match byte {
                    b'\n' => Step::Token(Token::Char { char: '\n' }),
                    0 => Step::Token(Token::Char { char: '\r' }),
                    _ => Step::Reprocess(Some(Token::Char { char: '\r' })),
                }
            }
            State::Lf => {
                self.state = State::Idle;
                if byte == b'\r' {
                    Step::Pending
                } else {
                    Step::Reprocess(None)
                }
            }
            State::Escape => self.escape(byte),
            State::Arguments => self.arguments(byte),
            State::Discard => match byte {
                0x40..=0x7e => {
                    self.state = State::Idle;
                    Step::Pending
                }
                ESC => {
                    self.state = State::Idle;
                    Step::Reprocess(None)
                }
                _ => Step::Pending,
            },
            State::MouseButton => {
                self.mouse_button = byte.saturating_sub(MOUSE_OFFSET);
                self.state = State::MouseX;
                Step::Pending
            }
            State::MouseX => {
                self.mouse_x = u32::from(byte.saturating_sub(MOUSE_OFFSET));
                self.state = State::MouseY;
                Step::Pending
            }
            State::MouseY => {
                self.mouse_y = u32::from(byte.saturating_sub(MOUSE_OFFSET));
                let token =
                    mouse_token(self.mouse_button, self.mouse_x, self.mouse_y, None, self.meta);
                self.reset();
                Step::Token(token)
            }
        }
    }

    fn idle(&mut self, byte: u8) -> Step {
        match byte {
            b'\r' => {
                self.state = State::Cr;
                Step::Pending
            }
            b'\n' => {
                self.state = State::Lf;
                Step::Token(Token::Char { char: '\n' })
            }
            ESC => {
                self.state = State::Escape;
                self.meta = false;
                Step::Pending
            }
            _ => Step::Token(Token::Char { char: char::from(byte) }),
        }
    }

    fn escape(&mut self, byte: u8) -> Step {
        let modifiers = Modifiers::meta(true);
        match byte {
            b'[' | b'O' => {
                self.state = State::Arguments;
                self.initiator = byte;
                self.argument.clear();
                self.arguments.clear();
                Step::Pending
            }
            ESC if !self.meta => {
                self.meta = true;
                Step::Pending
            }
            // Third ESC in a row: the first two were a meta-Escape
            ESC => {
                self.meta = false;
                Step::Token(Token::key(VirtualKey::Escape, modifiers))
            }
            DEL => {
                self.reset();
                Step::Token(Token::key(VirtualKey::Backspace, modifiers))
            }
            b'\r' | b'\n' => {
                self.reset();
                Step::Token(Token::key(VirtualKey::Enter, modifiers))
            }
            b'\t' => {
                self.reset();
                Step::Token(Token::key(VirtualKey::Char('\t'), modifiers))
            }
            0x20..=0x7e => {
                self.reset();
                Step::Token(Token::key(VirtualKey::Char(char::from(byte)), modifiers))
            }
            _ => {
                debug!("ignoring unknown escape {:#04x}", byte);
                self.reset();
                Step::Pending
            }
        }
    }

    fn arguments(&mut self, byte: u8) -> Step {
        match byte {
            b'0'..=b'9' => {
                if self.argument.len() >= MAX_ARGUMENT_LEN {
                    return self.abandon(byte);
                }
                self.argument.push(char::from(byte));
                Step::Pending
            }
            b';' => {
                if self.arguments.len() >= MAX_ARGUMENTS {
                    return self.abandon(byte);
                }
                self.arguments.push(std::mem::take(&mut self.argument));
                Step::Pending
            }
            // Intermediates and sub-parameters: nothing we decode uses them
            b':' | 0x20..=0x2f => self.abandon(byte),
            b'<' | b'=' | b'>' | b'?' if self.is_fresh_csi() => {
                self.initiator = byte;
                Step::Pending
            }
            ESC => {
                debug!("escape sequence interrupted by ESC");
                self.reset();
                Step::Reprocess(None)
            }
            b'M' if self.is_fresh_csi() => {
                self.state = State::MouseButton;
                Step::Pending
            }
            0x40..=0x7e => {
                if !self.argument.is_empty() || !self.arguments.is_empty() {
                    self.arguments.push(std::mem::take(&mut self.argument));
                }
                let token = self.dispatch(byte);
                if token.is_none() {
                    debug!(
                        "ignoring unknown sequence {:?} {:?} {:?}",
                        char::from(self.initiator),
                        self.arguments,
                        char::from(byte)
                    );
                }
                self.reset();
                token.map_or(Step::Pending, Step::Token)
            }
            _ => self.abandon(byte),
        }
    }

    /// ESC [ with nothing collected yet
    fn is_fresh_csi(&self) -> bool {
        self.initiator == b'[' && self.argument.is_empty() && self.arguments.is_empty()
    }

    /// Give up on the current sequence. The rest of it, up to the final
    /// byte, is swallowed.
    fn abandon(&mut self, byte: u8) -> Step {
        debug!("abandoning escape sequence at {:#04x}", byte);
        self.reset();
        self.state = State::Discard;
        Step::Pending
    }

    /// Numeric argument at `index`, `default` when missing, empty or malformed
    fn argument(&self, index: usize, default: u32) -> u32 {
        self.arguments
            .get(index)
            .filter(|arg| !arg.is_empty())
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(default)
    }

    /// Build the token for a completed sequence
    fn dispatch(&self, final_byte: u8) -> Option<Token> {
        match self.initiator {
            b'[' | b'O' => {
                let mut modifiers = Modifiers::from_parameter(self.argument(1, 1));
                modifiers.meta |= self.meta;
                let key = match final_byte {
                    b'~' => tilde_key(self.argument(0, 1))?,
                    b'Z' => {
                        modifiers.shift = true;
                        VirtualKey::BackTab
                    }
                    // Keypad Enter in application mode
                    b'M' if self.initiator == b'O' => VirtualKey::Enter,
                    _ => final_key(final_byte)?,
                };
                Some(Token::key(key, modifiers))
            }
            b'<' if matches!(final_byte, b'M' | b'm') && self.arguments.len() == 3 => {
                let button = u8::try_from(self.argument(0, 0)).ok()?;
                let released = final_byte == b'm';
                Some(mouse_token(
                    button,
                    self.argument(1, 1),
                    self.argument(2, 1),
                    Some(released),
                    self.meta,
                ))
            }
            _ => None,
        }
    }
}

/// Keys identified by the final byte alone
fn final_key(final_byte: u8) -> Option<VirtualKey> {
    Some(match final_byte {
        b'A' => VirtualKey::Up,
        b'B' => VirtualKey::Down,
        b'C' => VirtualKey::Right,
        b'D' => VirtualKey::Left,
        b'H' => VirtualKey::Home,
        b'F' => VirtualKey::End,
        b'P' => VirtualKey::F1,
        b'Q' => VirtualKey::F2,
        b'R' => VirtualKey::F3,
        b'S' => VirtualKey::F4,
        _ => return None,
    })
}

/// VT keypad and function keys: `CSI n ~`
fn tilde_key(n: u32) -> Option<VirtualKey> {
    Some(match n {
        1 | 7 => VirtualKey::Home,
        2 => VirtualKey::Insert,
        3 => VirtualKey::Delete,
        4 | 8 => VirtualKey::End,
        5 => VirtualKey::PageUp,
        6 => VirtualKey::PageDown,
        11 => VirtualKey::F1,
        12 => VirtualKey::F2,
        13 => VirtualKey::F3,
        14 => VirtualKey::F4,
        15 => VirtualKey::F5,
        17 => VirtualKey::F6,
        18 => VirtualKey::F7,
        19 => VirtualKey::F8,
        20 => VirtualKey::F9,
        21 => VirtualKey::F10,
        23 => VirtualKey::F11,
        24 => VirtualKey::F12,
        _ => return None,
    })
}

/// Build a mouse token from a button code (report offset already removed)
/// and 1-based coordinates. `released` is the SGR final byte verdict; X10
/// reports carry release in the button code instead. `meta` is set when the
/// report arrived behind an extra ESC.
fn mouse_token(code: u8, x: u32, y: u32, released: Option<bool>, meta: bool) -> Token {
    let button_bits = code & 0x03;
    let motion = code & 0x20 != 0;

    let button = if code & 0x40 != 0 {
        match button_bits {
            0 => MouseButton::WheelUp,
            1 => MouseButton::WheelDown,
            _ => MouseButton::None,
        }
    } else {
        match button_bits {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        }
    };

    let action = match released {
        Some(true) => MouseAction::Release,
        None if button_bits == 3 && !motion => MouseAction::Release,
        _ if motion => MouseAction::Move,
        _ => MouseAction::Press,
    };

    let modifiers = Modifiers {
        shift: code & 0x04 != 0,
        meta: code & 0x08 != 0 || meta,
        ctrl: code & 0x10 != 0,
        alt: false,
    };

    Token::Mouse {
        button,
        action,
        position: Coordinate::new(
            x.saturating_sub(1) as usize,
            y.saturating_sub(1) as usize,
        ),
        modifiers,
    }
}
