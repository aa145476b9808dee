use crate::keys::{self, digit, function, letter};
use crate::overlay::event::KeyId;

/// Where a key's icon lives in the prepared artwork.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IconSource {
    /// Cell of the bindings sheet, in key units relative to the sheet origin.
    /// Columns are fractional because rows are staggered.
    Sheet { row: u32, col: f64 },
    /// Top-left pixel of a square tile in the arrows sheet.
    Arrow { x: u32, y: u32 },
}

/// Immutable key to icon-position table, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardLayout {
    entries: Vec<(KeyId, IconSource)>,
}

impl KeyboardLayout {
    pub fn new(entries: Vec<(KeyId, IconSource)>) -> Self {
        Self { entries }
    }

    /// Full-size US layout matching the reference bindings sheet.
    pub fn standard() -> Self {
        let mut builder = LayoutBuilder::default();

        builder.sheet(0, 0.0, Some(keys::ESCAPE));
        for (n, col) in [(1, 2.0), (2, 3.0), (3, 4.0), (4, 5.0)] {
            builder.sheet(0, col, function(n));
        }
        for (n, col) in [(5, 6.5), (6, 7.5), (7, 8.5), (8, 9.5)] {
            builder.sheet(0, col, function(n));
        }
        for (n, col) in [(9, 11.0), (10, 12.0), (11, 13.0), (12, 14.0)] {
            builder.sheet(0, col, function(n));
        }

        builder.sheet(1, 0.0, Some(keys::BACKQUOTE));
        for d in 1..=9 {
            builder.sheet(1, f64::from(d), digit(d));
        }
        builder.sheet(1, 10.0, digit(0));
        builder.sheet(1, 11.0, Some(keys::MINUS));
        builder.sheet(1, 12.0, Some(keys::EQUAL));

        builder.letters(2, 1.5, "QWERTYUIOP");
        builder.sheet(2, 11.5, Some(keys::LEFT_BRACKET));
        builder.sheet(2, 12.5, Some(keys::RIGHT_BRACKET));
        builder.sheet(2, 13.75, Some(keys::BACKSLASH));

        builder.letters(3, 2.0, "ASDFGHJKL");
        builder.sheet(3, 11.0, Some(keys::SEMICOLON));
        builder.sheet(3, 12.0, Some(keys::QUOTE));

        for key in [keys::SHIFT_LEFT, keys::SHIFT_RIGHT] {
            builder.sheet(4, 0.75, Some(key));
        }
        builder.letters(4, 2.5, "ZXCVBNM");
        builder.sheet(4, 9.5, Some(keys::COMMA));
        builder.sheet(4, 10.5, Some(keys::DOT));

        for key in [keys::CONTROL_LEFT, keys::CONTROL_RIGHT] {
            builder.sheet(5, 0.25, Some(key));
        }
        for key in [keys::ALT_LEFT, keys::ALT_RIGHT] {
            builder.sheet(5, 3.25, Some(key));
        }
        builder.sheet(5, 7.0, Some(keys::SPACE));

        builder.sheet(0, 16.25, Some(keys::SCROLL_LOCK));
        builder.sheet(1, 15.25, Some(keys::INSERT));
        builder.sheet(1, 16.25, Some(keys::HOME));
        builder.sheet(1, 17.25, Some(keys::PAGE_UP));
        builder.sheet(2, 15.25, Some(keys::DELETE));
        builder.sheet(2, 16.25, Some(keys::END));
        builder.sheet(2, 17.25, Some(keys::PAGE_DOWN));

        builder.arrow(keys::LEFT, 0, 228);
        builder.arrow(keys::UP, 239, 0);
        builder.arrow(keys::RIGHT, 0, 0);
        builder.arrow(keys::DOWN, 239, 228);

        Self::new(builder.entries)
    }

    pub fn get(&self, key: KeyId) -> Option<IconSource> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, source)| *source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyId, IconSource)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
struct LayoutBuilder {
    entries: Vec<(KeyId, IconSource)>,
}

impl LayoutBuilder {
    fn sheet(&mut self, row: u32, col: f64, key: Option<KeyId>) {
        if let Some(key) = key {
            self.entries.push((key, IconSource::Sheet { row, col }));
        }
    }

    fn letters(&mut self, row: u32, first_col: f64, letters: &str) {
        for (i, c) in letters.chars().enumerate() {
            self.sheet(row, first_col + i as f64, letter(c));
        }
    }

    fn arrow(&mut self, key: KeyId, x: u32, y: u32) {
        self.entries.push((key, IconSource::Arrow { x, y }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_layout_has_unique_keys() {
        let layout = KeyboardLayout::standard();
        let unique: HashSet<_> = layout.iter().map(|(key, _)| key).collect();
        assert_eq!(unique.len(), layout.len());
        assert_eq!(layout.len(), 77);
    }

    #[test]
    fn staggered_rows_use_fractional_columns() {
        let layout = KeyboardLayout::standard();
        assert_eq!(
            layout.get(KeyId(81)),
            Some(IconSource::Sheet { row: 2, col: 1.5 })
        );
        assert_eq!(
            layout.get(KeyId(77)),
            Some(IconSource::Sheet { row: 4, col: 8.5 })
        );
        assert_eq!(
            layout.get(keys::BACKSLASH),
            Some(IconSource::Sheet {
                row: 2,
                col: 13.75
            })
        );
    }

    #[test]
    fn modifier_variants_share_one_cell() {
        let layout = KeyboardLayout::standard();
        assert_eq!(layout.get(keys::SHIFT_LEFT), layout.get(keys::SHIFT_RIGHT));
        assert_eq!(layout.get(keys::CONTROL_LEFT), layout.get(keys::CONTROL_RIGHT));
        assert_eq!(layout.get(keys::ALT_LEFT), layout.get(keys::ALT_RIGHT));
        // Only sided codes reach the grid from the hook.
        assert_eq!(layout.get(KeyId(0x10)), None);
        assert_eq!(layout.get(KeyId(0x11)), None);
        assert_eq!(layout.get(KeyId(0x12)), None);
    }

    #[test]
    fn arrows_come_from_the_arrow_sheet() {
        let layout = KeyboardLayout::standard();
        assert_eq!(layout.get(keys::UP), Some(IconSource::Arrow { x: 239, y: 0 }));
        assert_eq!(layout.get(keys::LEFT), Some(IconSource::Arrow { x: 0, y: 228 }));
        assert_eq!(layout.get(keys::TAB), None);
    }
}
