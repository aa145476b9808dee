use std::time::Instant;

/// Stable token naming a physical key, independent of the edge.
///
/// The value is the Windows virtual-key code of the key, which is what the
/// keyboard layout table and the hook backend agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u32);

impl KeyId {
    pub const fn vk(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub edge: Edge,
    /// Monotonic timestamp taken when the hook observed the transition.
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn press(key: KeyId, timestamp: Instant) -> Self {
        Self {
            key,
            edge: Edge::Press,
            timestamp,
        }
    }

    pub fn release(key: KeyId, timestamp: Instant) -> Self {
        Self {
            key,
            edge: Edge::Release,
            timestamp,
        }
    }
}
