//! Cell coordinates
//!
//! Zero-based (column, row) addressing shared by the encoder, the decoder's
//! mouse reports and the canvas.

use serde::{Deserialize, Serialize};

/// A terminal cell position. `x` is the column, `y` the row, both zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    /// The top-left cell
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0 };

    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}
