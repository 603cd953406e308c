//! Terminal capability profile
//!
//! Which optional escape-sequence families the connected terminal is known
//! to honor. There is no terminfo lookup: the caller states what it knows,
//! once, and the encoder only ever reads it.

use serde::{Deserialize, Serialize};

/// Optional cursor-motion families the encoder may choose from.
///
/// Relative motion (`CUU`/`CUD`/`CUF`/`CUB`) and absolute positioning (`CUP`)
/// are assumed everywhere and have no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// `CSI n G` (CHA) is understood
    pub horizontal_absolute: bool,
    /// `CSI G` with the argument omitted means column 1.
    /// Only consulted when `horizontal_absolute` is set.
    pub horizontal_absolute_default: bool,
    /// `CSI n d` (VPA) is understood
    pub vertical_absolute: bool,
}

impl Capabilities {
    /// Every optional family available
    pub const fn all() -> Self {
        Self {
            horizontal_absolute: true,
            horizontal_absolute_default: true,
            vertical_absolute: true,
        }
    }

    /// Nothing beyond CUP and relative motion
    pub const fn relative_only() -> Self {
        Self {
            horizontal_absolute: false,
            horizontal_absolute_default: false,
            vertical_absolute: false,
        }
    }

    /// True when column 0 may be reached with a bare `CSI G`
    pub fn omits_horizontal_default(&self) -> bool {
        self.horizontal_absolute && self.horizontal_absolute_default
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_everything() {
        assert_eq!(Capabilities::default(), Capabilities::all());
        assert!(Capabilities::default().omits_horizontal_default());
    }

    #[test]
    fn test_default_argument_needs_cha() {
        let caps = Capabilities {
            horizontal_absolute: false,
            horizontal_absolute_default: true,
            ..Capabilities::default()
        };
        assert!(!caps.omits_horizontal_default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let caps: Capabilities = serde_json::from_str(r#"{"vertical_absolute":false}"#).unwrap();
        assert!(caps.horizontal_absolute);
        assert!(caps.horizontal_absolute_default);
        assert!(!caps.vertical_absolute);
    }
}
