//! CSI sequence rendering
//!
//! Every sequence the encoder can emit, with its exact rendered length so
//! candidates can be compared without rendering them.

use bytes::{BufMut, BytesMut};

use super::MouseMode;

/// Control Sequence Introducer
pub const CSI: &[u8] = b"\x1b[";

/// One cursor-control sequence.
///
/// Arguments are stored zero-based for positions and as counts for motion;
/// `write` applies the 1-based conversion and the argument-omission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Csi {
    /// CUP. (0, 0) renders as a bare `CSI H`.
    CursorPosition { x: usize, y: usize },
    /// CHA. Column 0 renders as a bare `CSI G` when `omit_default` is set.
    HorizontalAbsolute { x: usize, omit_default: bool },
    /// VPA. Row 0 renders as a bare `CSI d`.
    VerticalAbsolute { y: usize },
    /// CUU
    Up(usize),
    /// CUD
    Down(usize),
    /// CUF
    Right(usize),
    /// CUB
    Left(usize),
    ShowCursor,
    HideCursor,
    SaveCursor,
    RestoreCursor,
    /// DEC private mode set/reset (`CSI ? n h` / `CSI ? n l`)
    PrivateMode { mode: u16, enabled: bool },
}

/// Number of decimal digits in `n`
pub fn digits(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Terminal (1-based) form of a zero-based position. The last `usize`
/// column is unreachable and clamps to the one before it.
fn one_based(n: usize) -> usize {
    n.saturating_add(1)
}

/// Rendered width of a count argument that is omitted when it equals 1
fn count_len(n: usize) -> usize {
    if n == 1 {
        0
    } else {
        digits(n)
    }
}

impl Csi {
    /// Exact number of bytes `write` will produce
    pub fn cost(&self) -> usize {
        let args = match *self {
            Csi::CursorPosition { x: 0, y: 0 } => 0,
            Csi::CursorPosition { x, y } => digits(one_based(y)) + 1 + digits(one_based(x)),
            Csi::HorizontalAbsolute { x: 0, omit_default: true } => 0,
            Csi::HorizontalAbsolute { x, .. } => digits(one_based(x)),
            Csi::VerticalAbsolute { y: 0 } => 0,
            Csi::VerticalAbsolute { y } => digits(one_based(y)),
            Csi::Up(n) | Csi::Down(n) | Csi::Right(n) | Csi::Left(n) => count_len(n),
            Csi::ShowCursor | Csi::HideCursor => 3,
            Csi::SaveCursor | Csi::RestoreCursor => 0,
            Csi::PrivateMode { mode, .. } => 1 + digits(usize::from(mode)),
        };
        CSI.len() + args + 1
    }

    /// Render into `buf`
    pub fn write(&self, buf: &mut BytesMut) {
        buf.reserve(self.cost());
        buf.put_slice(CSI);
        match *self {
            Csi::CursorPosition { x: 0, y: 0 } => buf.put_u8(b'H'),
            Csi::CursorPosition { x, y } => {
                put_number(buf, one_based(y));
                buf.put_u8(b';');
                put_number(buf, one_based(x));
                buf.put_u8(b'H');
            }
            Csi::HorizontalAbsolute { x: 0, omit_default: true } => buf.put_u8(b'G'),
            Csi::HorizontalAbsolute { x, .. } => {
                put_number(buf, one_based(x));
                buf.put_u8(b'G');
            }
            Csi::VerticalAbsolute { y: 0 } => buf.put_u8(b'd'),
            Csi::VerticalAbsolute { y } => {
                put_number(buf, one_based(y));
                buf.put_u8(b'd');
            }
            Csi::Up(n) => put_count(buf, n, b'A'),
            Csi::Down(n) => put_count(buf, n, b'B'),
            Csi::Right(n) => put_count(buf, n, b'C'),
            Csi::Left(n) => put_count(buf, n, b'D'),
            Csi::ShowCursor => buf.put_slice(b"?25h"),
            Csi::HideCursor => buf.put_slice(b"?25l"),
            Csi::SaveCursor => buf.put_u8(b's'),
            Csi::RestoreCursor => buf.put_u8(b'u'),
            Csi::PrivateMode { mode, enabled } => {
                buf.put_u8(b'?');
                put_number(buf, usize::from(mode));
                buf.put_u8(if enabled { b'h' } else { b'l' });
            }
        }
    }
}

fn put_number(buf: &mut BytesMut, n: usize) {
    buf.put_slice(n.to_string().as_bytes());
}

fn put_count(buf: &mut BytesMut, n: usize, final_byte: u8) {
    if n != 1 {
        put_number(buf, n);
    }
    buf.put_u8(final_byte);
}

/// The private modes that switch a given mouse reporting mode on
pub fn mouse_modes(mode: MouseMode) -> &'static [u16] {
    match mode {
        MouseMode::Normal => &[1000],
        MouseMode::Button => &[1002],
        MouseMode::Any => &[1003],
        // SGR extended coordinates + button event tracking
        MouseMode::Sgr => &[1006, 1002],
    }
}

/// Every private mode touched by any mouse mode
pub const ALL_MOUSE_MODES: [u16; 4] = [1000, 1002, 1003, 1006];

#[cfg(test)]
mod tests {
    use super::*;

    fn render(seq: Csi) -> String {
        let mut buf = BytesMut::new();
        seq.write(&mut buf);
        assert_eq!(buf.len(), seq.cost(), "cost mismatch for {:?}", seq);
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn test_digits() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(99), 2);
        assert_eq!(digits(100), 3);
    }

    #[test]
    fn test_cursor_position() {
        assert_eq!(render(Csi::CursorPosition { x: 0, y: 0 }), "\x1b[H");
        assert_eq!(render(Csi::CursorPosition { x: 2, y: 2 }), "\x1b[3;3H");
        assert_eq!(render(Csi::CursorPosition { x: 10, y: 3 }), "\x1b[4;11H");
        assert_eq!(render(Csi::CursorPosition { x: 0, y: 5 }), "\x1b[6;1H");
    }

    #[test]
    fn test_horizontal_absolute() {
        assert_eq!(render(Csi::HorizontalAbsolute { x: 0, omit_default: true }), "\x1b[G");
        assert_eq!(render(Csi::HorizontalAbsolute { x: 0, omit_default: false }), "\x1b[1G");
        assert_eq!(render(Csi::HorizontalAbsolute { x: 9, omit_default: true }), "\x1b[10G");
    }

    #[test]
    fn test_vertical_absolute() {
        assert_eq!(render(Csi::VerticalAbsolute { y: 0 }), "\x1b[d");
        assert_eq!(render(Csi::VerticalAbsolute { y: 7 }), "\x1b[8d");
    }

    #[test]
    fn test_largest_position_clamps() {
        let max = usize::MAX.to_string();
        assert_eq!(
            render(Csi::CursorPosition { x: usize::MAX, y: 3 }),
            format!("\x1b[4;{}H", max)
        );
        assert_eq!(render(Csi::VerticalAbsolute { y: usize::MAX }), format!("\x1b[{}d", max));
    }

    #[test]
    fn test_relative_counts() {
        assert_eq!(render(Csi::Up(1)), "\x1b[A");
        assert_eq!(render(Csi::Down(2)), "\x1b[2B");
        assert_eq!(render(Csi::Right(1)), "\x1b[C");
        assert_eq!(render(Csi::Left(10)), "\x1b[10D");
    }

    #[test]
    fn test_fixed_sequences() {
        assert_eq!(render(Csi::ShowCursor), "\x1b[?25h");
        assert_eq!(render(Csi::HideCursor), "\x1b[?25l");
        assert_eq!(render(Csi::SaveCursor), "\x1b[s");
        assert_eq!(render(Csi::RestoreCursor), "\x1b[u");
        assert_eq!(render(Csi::PrivateMode { mode: 1006, enabled: true }), "\x1b[?1006h");
        assert_eq!(render(Csi::PrivateMode { mode: 1000, enabled: false }), "\x1b[?1000l");
    }
}
