//! Virtual-key codes for the keys the overlay knows how to draw.

use crate::overlay::event::KeyId;

pub const BACKSPACE: KeyId = KeyId(0x08);
pub const TAB: KeyId = KeyId(0x09);
pub const RETURN: KeyId = KeyId(0x0D);
pub const CAPS_LOCK: KeyId = KeyId(0x14);
pub const ESCAPE: KeyId = KeyId(0x1B);
pub const SPACE: KeyId = KeyId(0x20);
pub const PAGE_UP: KeyId = KeyId(0x21);
pub const PAGE_DOWN: KeyId = KeyId(0x22);
pub const END: KeyId = KeyId(0x23);
pub const HOME: KeyId = KeyId(0x24);
pub const LEFT: KeyId = KeyId(0x25);
pub const UP: KeyId = KeyId(0x26);
pub const RIGHT: KeyId = KeyId(0x27);
pub const DOWN: KeyId = KeyId(0x28);
pub const INSERT: KeyId = KeyId(0x2D);
pub const DELETE: KeyId = KeyId(0x2E);
pub const SCROLL_LOCK: KeyId = KeyId(0x91);
pub const SHIFT_LEFT: KeyId = KeyId(0xA0);
pub const SHIFT_RIGHT: KeyId = KeyId(0xA1);
pub const CONTROL_LEFT: KeyId = KeyId(0xA2);
pub const CONTROL_RIGHT: KeyId = KeyId(0xA3);
pub const ALT_LEFT: KeyId = KeyId(0xA4);
pub const ALT_RIGHT: KeyId = KeyId(0xA5);
pub const SEMICOLON: KeyId = KeyId(0xBA);
pub const EQUAL: KeyId = KeyId(0xBB);
pub const COMMA: KeyId = KeyId(0xBC);
pub const MINUS: KeyId = KeyId(0xBD);
pub const DOT: KeyId = KeyId(0xBE);
pub const SLASH: KeyId = KeyId(0xBF);
pub const BACKQUOTE: KeyId = KeyId(0xC0);
pub const LEFT_BRACKET: KeyId = KeyId(0xDB);
pub const BACKSLASH: KeyId = KeyId(0xDC);
pub const RIGHT_BRACKET: KeyId = KeyId(0xDD);
pub const QUOTE: KeyId = KeyId(0xDE);

/// `'A'..='Z'` map to their ASCII code; anything else yields `None`.
pub const fn letter(c: char) -> Option<KeyId> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(KeyId(upper as u32))
    } else {
        None
    }
}

/// Top-row digit `0..=9`.
pub const fn digit(d: u32) -> Option<KeyId> {
    if d <= 9 {
        Some(KeyId(0x30 + d))
    } else {
        None
    }
}

/// Function key `F1..=F24`.
pub const fn function(n: u32) -> Option<KeyId> {
    if n >= 1 && n <= 24 {
        Some(KeyId(0x6F + n))
    } else {
        None
    }
}
