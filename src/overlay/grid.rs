use crate::overlay::event::{Edge, KeyEvent, KeyId};
use crate::overlay::icons::{IconHandle, IconProvider};
use crate::overlay::row::{duration_ms, LabelRow, PendingLabel, RowAdd};
use crate::overlay::sink::{LabelHandle, LabelSink, LabelStyle};
use std::time::{Duration, Instant};

pub const DEFAULT_NEW_ROW_MS: u64 = 1380;
pub const DEFAULT_CLEAR_ROW_MS: u64 = 2250;
pub const DEFAULT_HOLD_MS: u64 = 75;
pub const DEFAULT_ROW_HEIGHT_PX: i32 = 60;
pub const DEFAULT_LABEL_PITCH_PX: i32 = 45;
pub const DEFAULT_ROW_WIDTH_PX: i32 = 410;
pub const DEFAULT_ICON_SIZE_PX: i32 = 32;

/// Timing thresholds and geometry the grid applies on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Gap after which the next event starts a fresh row.
    pub new_row: Duration,
    /// Rows idle for longer than this are swept.
    pub clear_row: Duration,
    /// Repeats of the trailing key and edge faster than this are coalesced.
    pub hold: Duration,
    pub row_height: i32,
    pub label_pitch: i32,
    pub row_width: i32,
    pub icon_size: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            new_row: Duration::from_millis(DEFAULT_NEW_ROW_MS),
            clear_row: Duration::from_millis(DEFAULT_CLEAR_ROW_MS),
            hold: Duration::from_millis(DEFAULT_HOLD_MS),
            row_height: DEFAULT_ROW_HEIGHT_PX,
            label_pitch: DEFAULT_LABEL_PITCH_PX,
            row_width: DEFAULT_ROW_WIDTH_PX,
            icon_size: DEFAULT_ICON_SIZE_PX,
        }
    }
}

impl GridConfig {
    /// How many labels fit in one row. Never less than one.
    pub fn max_labels_per_row(&self) -> usize {
        let per_label = self.icon_size + (self.label_pitch - self.icon_size);
        if per_label <= 0 || self.row_width <= 0 {
            return 1;
        }
        usize::try_from(self.row_width / per_label)
            .unwrap_or(1)
            .max(1)
    }

    /// Rightmost x a label may start at without leaving the viewport.
    pub fn wraparound_width(&self) -> i32 {
        self.row_width - self.icon_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Appended { row: usize, handle: LabelHandle },
    Coalesced { row: usize, handle: LabelHandle },
    /// No icon for the key; nothing changed.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub rows_swept: usize,
    pub labels_destroyed: usize,
}

/// Buckets a key event stream into rows and ages them out.
///
/// The grid holds no lock and must be driven from a single thread together
/// with its [`LabelSink`].
#[derive(Debug, Clone)]
pub struct LabelGrid {
    rows: Vec<LabelRow>,
    last_active: Option<Instant>,
    config: GridConfig,
}

impl Default for LabelGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl LabelGrid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            rows: Vec::new(),
            last_active: None,
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn rows(&self) -> &[LabelRow] {
        &self.rows
    }

    pub fn last_active(&self) -> Option<Instant> {
        self.last_active
    }

    pub fn label_count(&self) -> usize {
        self.rows.iter().map(LabelRow::len).sum()
    }

    /// Resolves the icon for `event` and ingests it. Keys without an icon are
    /// dropped silently.
    pub fn ingest_event<P, S>(&mut self, event: &KeyEvent, icons: &P, sink: &mut S) -> IngestOutcome
    where
        P: IconProvider + ?Sized,
        S: LabelSink + ?Sized,
    {
        let Some(icon) = icons.resolve_icon(event.key) else {
            tracing::trace!(key = event.key.vk(), "dropping key without icon");
            return IngestOutcome::Dropped;
        };
        self.ingest(event.key, icon, event.edge, event.timestamp, sink)
    }

    pub fn ingest<S>(
        &mut self,
        key: KeyId,
        icon: IconHandle,
        edge: Edge,
        now: Instant,
        sink: &mut S,
    ) -> IngestOutcome
    where
        S: LabelSink + ?Sized,
    {
        let gap = self
            .last_active
            .map(|last| now.saturating_duration_since(last));

        if self.rows.is_empty() || gap.map_or(true, |gap| gap > self.config.new_row) {
            tracing::debug!(rows = self.rows.len() + 1, "starting row after idle gap");
            self.rows.push(LabelRow::new(now));
        }

        let capacity = self.config.max_labels_per_row();
        if self.rows.last().map_or(0, LabelRow::len) >= capacity {
            tracing::debug!(capacity, "row full, wrapping to a new row");
            self.rows.push(LabelRow::new(now));
        }

        let (display_text, style) = match gap {
            None => (None, LabelStyle::Neutral),
            Some(gap) => {
                let style = match edge {
                    Edge::Press => LabelStyle::Press,
                    Edge::Release => LabelStyle::Release,
                };
                (Some(duration_ms(gap).to_string()), style)
            }
        };

        let row_index = self.rows.len() - 1;
        let pending = PendingLabel {
            key,
            edge,
            icon,
            display_text,
            style,
        };
        let outcome = match self.rows[row_index].add(pending, now, self.config.hold, sink) {
            RowAdd::Appended(handle) => IngestOutcome::Appended {
                row: row_index,
                handle,
            },
            RowAdd::Coalesced(handle) => IngestOutcome::Coalesced {
                row: row_index,
                handle,
            },
        };

        self.last_active = Some(now);
        outcome
    }

    /// Sweeps rows idle for longer than the clear threshold, then lays the
    /// survivors out top to bottom from `y = 0`.
    pub fn reposition<S>(&mut self, now: Instant, wraparound_width: i32, sink: &mut S) -> SweepReport
    where
        S: LabelSink + ?Sized,
    {
        let clear_row = self.config.clear_row;
        let mut report = SweepReport::default();

        self.rows.retain_mut(|row| {
            if now.saturating_duration_since(row.last_active()) > clear_row {
                report.labels_destroyed += row.destroy(sink);
                report.rows_swept += 1;
                false
            } else {
                true
            }
        });

        if report.rows_swept > 0 {
            tracing::debug!(
                rows_swept = report.rows_swept,
                labels_destroyed = report.labels_destroyed,
                rows_left = self.rows.len(),
                "swept idle rows"
            );
        }

        let mut y = 0;
        for row in &self.rows {
            y = row.reposition(y, wraparound_width, &self.config, sink);
        }

        report
    }

    /// Releases every row, e.g. on shutdown. Returns the number of labels released.
    pub fn clear<S>(&mut self, sink: &mut S) -> usize
    where
        S: LabelSink + ?Sized,
    {
        let released: usize = self.rows.iter_mut().map(|row| row.destroy(sink)).sum();
        self.rows.clear();
        released
    }
}
