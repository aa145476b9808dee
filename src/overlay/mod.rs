pub mod driver;
pub mod event;
pub mod grid;
pub mod icons;
pub mod row;
pub mod scene;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{OverlayDriver, PumpReport};
pub use event::{Edge, KeyEvent, KeyId};
pub use grid::{GridConfig, IngestOutcome, LabelGrid, SweepReport};
pub use icons::{IconHandle, IconProvider, StaticIconMap};
pub use row::{Label, LabelRow, PendingLabel, RowAdd};
pub use scene::{Scene, SceneLabel, SceneStats};
pub use sink::{LabelHandle, LabelSink, LabelStyle};
