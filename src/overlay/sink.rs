use crate::overlay::icons::IconHandle;

/// Opaque reference to a visual element owned by a [`LabelSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(pub usize);

/// Visual emphasis of a label. The sink maps each style to concrete colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Very first event of the grid; shown without a gap.
    Neutral,
    Press,
    Release,
    /// Trailing label absorbed a key repeat.
    Held,
}

/// Capability set the grid needs from whatever draws the labels.
///
/// All calls happen on the thread that owns the grid.
pub trait LabelSink {
    fn create_label(&mut self, icon: IconHandle, text: Option<&str>, style: LabelStyle)
        -> LabelHandle;

    fn place(&mut self, handle: LabelHandle, x: i32, y: i32);

    fn recolor(&mut self, handle: LabelHandle, style: LabelStyle);

    fn destroy(&mut self, handle: LabelHandle);
}
