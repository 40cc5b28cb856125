//! Game Boy Advance buttons as the engine numbers them.
//!
//! The engine takes raw key codes 0-9: the eight Game Boy buttons in their
//! classic order, then the two shoulder buttons.

use serde::{Deserialize, Serialize};

/// Game Boy Advance buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GbaKey {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Right = 4,
    Left = 5,
    Up = 6,
    Down = 7,
    R = 8,
    L = 9,
}

impl GbaKey {
    pub const ALL: [GbaKey; 10] = [
        GbaKey::A,
        GbaKey::B,
        GbaKey::Select,
        GbaKey::Start,
        GbaKey::Right,
        GbaKey::Left,
        GbaKey::Up,
        GbaKey::Down,
        GbaKey::R,
        GbaKey::L,
    ];

    /// Convert a raw key code to a `GbaKey`.
    /// Returns `None` if the value is out of range.
    pub fn from_code(value: u8) -> Option<GbaKey> {
        match value {
            0 => Some(GbaKey::A),
            1 => Some(GbaKey::B),
            2 => Some(GbaKey::Select),
            3 => Some(GbaKey::Start),
            4 => Some(GbaKey::Right),
            5 => Some(GbaKey::Left),
            6 => Some(GbaKey::Up),
            7 => Some(GbaKey::Down),
            8 => Some(GbaKey::R),
            9 => Some(GbaKey::L),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_shoulder(self) -> bool {
        matches!(self, GbaKey::R | GbaKey::L)
    }
}
