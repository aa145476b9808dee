use crate::overlay::event::KeyId;
use std::collections::HashMap;

/// Index of a prepared icon image. Renderers resolve it to whatever texture
/// they uploaded for that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub usize);

pub trait IconProvider {
    /// `None` means the key has no icon and its events are dropped.
    fn resolve_icon(&self, key: KeyId) -> Option<IconHandle>;
}

/// Fixed key to icon mapping, built once before the grid starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIconMap {
    icons: HashMap<KeyId, IconHandle>,
}

impl StaticIconMap {
    pub fn new(icons: HashMap<KeyId, IconHandle>) -> Self {
        Self { icons }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl FromIterator<(KeyId, IconHandle)> for StaticIconMap {
    fn from_iter<T: IntoIterator<Item = (KeyId, IconHandle)>>(iter: T) -> Self {
        Self {
            icons: iter.into_iter().collect(),
        }
    }
}

impl IconProvider for StaticIconMap {
    fn resolve_icon(&self, key: KeyId) -> Option<IconHandle> {
        self.icons.get(&key).copied()
    }
}
