use crate::overlay::icons::IconHandle;
use crate::overlay::sink::{LabelHandle, LabelSink, LabelStyle};
use slab::Slab;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLabel {
    pub icon: IconHandle,
    pub text: Option<String>,
    pub style: LabelStyle,
    /// `None` until the first layout pass places the label.
    pub position: Option<(i32, i32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    pub created: u64,
    pub destroyed: u64,
    /// Calls that referenced a handle the scene no longer holds.
    pub stale: u64,
}

/// Retained label store the GUI paints from every frame.
#[derive(Debug, Default)]
pub struct Scene {
    labels: Slab<SceneLabel>,
    stats: SceneStats,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn get(&self, handle: LabelHandle) -> Option<&SceneLabel> {
        self.labels.get(handle.0)
    }

    /// Labels that have been laid out at least once.
    pub fn placed(&self) -> impl Iterator<Item = (LabelHandle, &SceneLabel, (i32, i32))> + '_ {
        self.labels.iter().filter_map(|(key, label)| {
            label
                .position
                .map(|position| (LabelHandle(key), label, position))
        })
    }

    fn note_stale(&mut self, handle: LabelHandle, op: &'static str) {
        self.stats.stale += 1;
        tracing::warn!(handle = handle.0, op, "label handle not in scene");
    }
}

impl LabelSink for Scene {
    fn create_label(
        &mut self,
        icon: IconHandle,
        text: Option<&str>,
        style: LabelStyle,
    ) -> LabelHandle {
        self.stats.created += 1;
        LabelHandle(self.labels.insert(SceneLabel {
            icon,
            text: text.map(str::to_owned),
            style,
            position: None,
        }))
    }

    fn place(&mut self, handle: LabelHandle, x: i32, y: i32) {
        match self.labels.get_mut(handle.0) {
            Some(label) => label.position = Some((x, y)),
            None => self.note_stale(handle, "place"),
        }
    }

    fn recolor(&mut self, handle: LabelHandle, style: LabelStyle) {
        match self.labels.get_mut(handle.0) {
            Some(label) => label.style = style,
            None => self.note_stale(handle, "recolor"),
        }
    }

    fn destroy(&mut self, handle: LabelHandle) {
        if self.labels.contains(handle.0) {
            self.labels.remove(handle.0);
            self.stats.destroyed += 1;
        } else {
            self.note_stale(handle, "destroy");
        }
    }
}
