use crate::overlay::event::{Edge, KeyId};
use crate::overlay::grid::GridConfig;
use crate::overlay::icons::IconHandle;
use crate::overlay::sink::{LabelHandle, LabelSink, LabelStyle};
use std::time::{Duration, Instant};

/// A label that has been handed to the sink and is owned by its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub handle: LabelHandle,
    pub key: KeyId,
    pub icon: IconHandle,
    pub display_text: Option<String>,
    pub created_at: Instant,
    /// Gap to the previous activity of the owning row, 0 for a row's first label.
    pub row_gap_ms: u64,
}

/// Everything the grid decided about a label before the row sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLabel {
    pub key: KeyId,
    pub edge: Edge,
    pub icon: IconHandle,
    pub display_text: Option<String>,
    pub style: LabelStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAdd {
    Appended(LabelHandle),
    /// The event repeated the trailing key and edge; the trailing label was
    /// recolored instead of appending.
    Coalesced(LabelHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Trailing {
    key: KeyId,
    edge: Edge,
    handle: LabelHandle,
}

/// A horizontal run of labels sharing one time bucket.
///
/// Rows only ever append or recolor their trailing label. Labels leave a row
/// all at once through [`LabelRow::destroy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    labels: Vec<Label>,
    last_active: Instant,
    trailing: Option<Trailing>,
}

impl LabelRow {
    pub fn new(now: Instant) -> Self {
        Self {
            labels: Vec::new(),
            last_active: now,
            trailing: None,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn trailing_key(&self) -> Option<KeyId> {
        self.trailing.map(|trailing| trailing.key)
    }

    pub fn trailing_handle(&self) -> Option<LabelHandle> {
        self.trailing.map(|trailing| trailing.handle)
    }

    pub fn add<S>(&mut self, pending: PendingLabel, now: Instant, hold: Duration, sink: &mut S) -> RowAdd
    where
        S: LabelSink + ?Sized,
    {
        let gap = now.saturating_duration_since(self.last_active);

        let outcome = match self.trailing {
            Some(trailing)
                if trailing.key == pending.key && trailing.edge == pending.edge && gap < hold =>
            {
                // The label list keeps the first entry; only the placed
                // visual changes colour.
                sink.recolor(trailing.handle, LabelStyle::Held);
                RowAdd::Coalesced(trailing.handle)
            }
            _ => {
                let handle =
                    sink.create_label(pending.icon, pending.display_text.as_deref(), pending.style);
                self.labels.push(Label {
                    handle,
                    key: pending.key,
                    icon: pending.icon,
                    display_text: pending.display_text,
                    created_at: now,
                    row_gap_ms: duration_ms(gap),
                });
                self.trailing = Some(Trailing {
                    key: pending.key,
                    edge: pending.edge,
                    handle,
                });
                RowAdd::Appended(handle)
            }
        };

        self.last_active = now;
        outcome
    }

    /// Releases every label to the sink. Returns how many were released;
    /// calling it again releases nothing.
    pub fn destroy<S>(&mut self, sink: &mut S) -> usize
    where
        S: LabelSink + ?Sized,
    {
        let released = self.labels.len();
        for label in self.labels.drain(..) {
            sink.destroy(label.handle);
        }
        self.trailing = None;
        released
    }

    /// Places labels left to right at `start_y` and returns the y of the next row.
    pub fn reposition<S>(
        &self,
        start_y: i32,
        wraparound_width: i32,
        config: &GridConfig,
        sink: &mut S,
    ) -> i32
    where
        S: LabelSink + ?Sized,
    {
        let mut x = 0;
        for label in &self.labels {
            if x > wraparound_width {
                tracing::warn!(
                    x,
                    wraparound_width,
                    "label placed past the wraparound width; row capacity is misconfigured"
                );
            }
            sink.place(label.handle, x, start_y);
            x += config.label_pitch;
        }
        start_y + config.row_height
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::{RecordingSink, SinkCall};

    const HOLD: Duration = Duration::from_millis(75);

    fn pending(key: u32, text: Option<&str>) -> PendingLabel {
        PendingLabel {
            key: KeyId(key),
            edge: Edge::Press,
            icon: IconHandle(key as usize),
            display_text: text.map(str::to_owned),
            style: LabelStyle::Press,
        }
    }

    #[test]
    fn first_label_has_zero_row_gap() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);

        let outcome = row.add(pending(65, None), t0, HOLD, &mut sink);

        assert!(matches!(outcome, RowAdd::Appended(_)));
        assert_eq!(row.len(), 1);
        assert_eq!(row.labels()[0].row_gap_ms, 0);
        assert_eq!(row.trailing_key(), Some(KeyId(65)));
    }

    #[test]
    fn fast_repeat_of_trailing_key_recolors_in_place() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);

        let first = row.add(pending(65, None), t0, HOLD, &mut sink);
        let RowAdd::Appended(handle) = first else {
            panic!("first add must append");
        };
        let repeat = row.add(
            pending(65, Some("30")),
            t0 + Duration::from_millis(30),
            HOLD,
            &mut sink,
        );

        assert_eq!(repeat, RowAdd::Coalesced(handle));
        assert_eq!(row.trailing_handle(), Some(handle));
        assert_eq!(row.len(), 1);
        assert_eq!(row.last_active(), t0 + Duration::from_millis(30));
        assert_eq!(sink.created(), 1);
        assert!(sink
            .calls()
            .contains(&SinkCall::Recolor(handle, LabelStyle::Held)));
        // The stored entry is not refreshed by the coalesce.
        assert_eq!(row.labels()[0].display_text, None);
    }

    #[test]
    fn repeat_at_hold_threshold_appends() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);

        row.add(pending(65, None), t0, HOLD, &mut sink);
        let outcome = row.add(pending(65, Some("75")), t0 + HOLD, HOLD, &mut sink);

        assert!(matches!(outcome, RowAdd::Appended(_)));
        assert_eq!(row.len(), 2);
        assert_eq!(row.labels()[1].row_gap_ms, 75);
    }

    #[test]
    fn quick_release_of_trailing_key_appends_its_own_label() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);

        row.add(pending(65, None), t0, HOLD, &mut sink);
        let release = PendingLabel {
            edge: Edge::Release,
            style: LabelStyle::Release,
            ..pending(65, Some("50"))
        };
        let outcome = row.add(release, t0 + Duration::from_millis(50), HOLD, &mut sink);

        assert!(matches!(outcome, RowAdd::Appended(_)));
        assert_eq!(row.len(), 2);
        assert!(!sink
            .calls()
            .iter()
            .any(|call| matches!(call, SinkCall::Recolor(..))));
        assert_eq!(
            sink.created_labels().last(),
            Some((Some("50".to_string()), LabelStyle::Release))
        );
    }

    #[test]
    fn different_key_inside_hold_window_appends() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);

        row.add(pending(65, None), t0, HOLD, &mut sink);
        row.add(
            pending(66, Some("10")),
            t0 + Duration::from_millis(10),
            HOLD,
            &mut sink,
        );

        assert_eq!(row.len(), 2);
        assert_eq!(row.trailing_key(), Some(KeyId(66)));
    }

    #[test]
    fn destroy_is_idempotent() {
        let t0 = Instant::now();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);
        row.add(pending(65, None), t0, HOLD, &mut sink);
        row.add(pending(66, Some("100")), t0 + Duration::from_millis(100), HOLD, &mut sink);

        assert_eq!(row.destroy(&mut sink), 2);
        assert_eq!(row.destroy(&mut sink), 0);
        assert_eq!(sink.destroyed(), 2);
        assert!(row.is_empty());
        assert_eq!(row.trailing_key(), None);
    }

    #[test]
    fn reposition_lays_out_by_pitch_and_returns_next_row_y() {
        let t0 = Instant::now();
        let config = GridConfig::default();
        let mut sink = RecordingSink::default();
        let mut row = LabelRow::new(t0);
        for (i, key) in [65, 66, 67].into_iter().enumerate() {
            row.add(
                pending(key, None),
                t0 + Duration::from_millis(100 * i as u64),
                HOLD,
                &mut sink,
            );
        }

        let next_y = row.reposition(120, config.wraparound_width(), &config, &mut sink);

        assert_eq!(next_y, 180);
        let handles: Vec<_> = row.labels().iter().map(|label| label.handle).collect();
        assert_eq!(sink.position(handles[0]), Some((0, 120)));
        assert_eq!(sink.position(handles[1]), Some((45, 120)));
        assert_eq!(sink.position(handles[2]), Some((90, 120)));
    }
}
