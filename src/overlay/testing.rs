use crate::overlay::icons::IconHandle;
use crate::overlay::sink::{LabelHandle, LabelSink, LabelStyle};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Create {
        icon: IconHandle,
        text: Option<String>,
        style: LabelStyle,
    },
    Place(LabelHandle, i32, i32),
    Recolor(LabelHandle, LabelStyle),
    Destroy(LabelHandle),
}

/// Sink that records every call and never reuses handles.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    next_handle: usize,
    positions: HashMap<LabelHandle, (i32, i32)>,
}

impl RecordingSink {
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    pub fn created(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::Create { .. }))
            .count()
    }

    pub fn destroyed(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::Destroy(_)))
            .count()
    }

    pub fn created_labels(&self) -> impl Iterator<Item = (Option<String>, LabelStyle)> + '_ {
        self.calls.iter().filter_map(|call| match call {
            SinkCall::Create { text, style, .. } => Some((text.clone(), *style)),
            _ => None,
        })
    }

    pub fn position(&self, handle: LabelHandle) -> Option<(i32, i32)> {
        self.positions.get(&handle).copied()
    }
}

impl LabelSink for RecordingSink {
    fn create_label(
        &mut self,
        icon: IconHandle,
        text: Option<&str>,
        style: LabelStyle,
    ) -> LabelHandle {
        let handle = LabelHandle(self.next_handle);
        self.next_handle += 1;
        self.calls.push(SinkCall::Create {
            icon,
            text: text.map(str::to_owned),
            style,
        });
        handle
    }

    fn place(&mut self, handle: LabelHandle, x: i32, y: i32) {
        self.positions.insert(handle, (x, y));
        self.calls.push(SinkCall::Place(handle, x, y));
    }

    fn recolor(&mut self, handle: LabelHandle, style: LabelStyle) {
        self.calls.push(SinkCall::Recolor(handle, style));
    }

    fn destroy(&mut self, handle: LabelHandle) {
        self.positions.remove(&handle);
        self.calls.push(SinkCall::Destroy(handle));
    }
}
