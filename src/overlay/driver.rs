use crate::keyboard_hook::KeyEventReceiver;
use crate::overlay::grid::{GridConfig, IngestOutcome, LabelGrid, SweepReport};
use crate::overlay::icons::IconProvider;
use crate::overlay::sink::LabelSink;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpReport {
    pub appended: usize,
    pub coalesced: usize,
    pub dropped: usize,
    pub sweep: SweepReport,
}

impl PumpReport {
    pub fn changed(&self) -> bool {
        self.appended + self.coalesced + self.sweep.rows_swept > 0
    }
}

/// Owns the grid on the render thread and feeds it from the hook queue.
pub struct OverlayDriver<P> {
    grid: LabelGrid,
    icons: P,
    events: KeyEventReceiver,
}

impl<P: IconProvider> OverlayDriver<P> {
    pub fn new(config: GridConfig, icons: P, events: KeyEventReceiver) -> Self {
        Self {
            grid: LabelGrid::new(config),
            icons,
            events,
        }
    }

    pub fn grid(&self) -> &LabelGrid {
        &self.grid
    }

    /// Ingests every queued event in arrival order, then sweeps and lays out
    /// the grid once. Called every frame, so idle rows age out without input.
    pub fn pump<S>(&mut self, now: Instant, sink: &mut S) -> PumpReport
    where
        S: LabelSink + ?Sized,
    {
        let mut report = PumpReport::default();
        let mut now = now;

        for event in self.events.drain() {
            now = now.max(event.timestamp);
            match self.grid.ingest_event(&event, &self.icons, sink) {
                IngestOutcome::Appended { .. } => report.appended += 1,
                IngestOutcome::Coalesced { .. } => report.coalesced += 1,
                IngestOutcome::Dropped => report.dropped += 1,
            }
        }

        let wraparound_width = self.grid.config().wraparound_width();
        report.sweep = self.grid.reposition(now, wraparound_width, sink);
        report
    }

    pub fn shutdown<S>(&mut self, sink: &mut S)
    where
        S: LabelSink + ?Sized,
    {
        let released = self.grid.clear(sink);
        tracing::debug!(released, "released overlay labels");
    }
}
