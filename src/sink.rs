use crate::tween::PropertyWrite;

/// Host-side receiver for reconciled property writes. The engine never
/// touches the page directly; everything it decides flows through this
/// seam, which keeps teardown deterministic and the core testable without
/// a real document.
pub trait PropertySink {
    fn apply(&mut self, write: &PropertyWrite);
}

/// Discards every write.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PropertySink for NullSink {
    fn apply(&mut self, _write: &PropertyWrite) {}
}

/// Captures writes in order, for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub writes: Vec<PropertyWrite>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }

    pub fn take(&mut self) -> Vec<PropertyWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl PropertySink for RecordingSink {
    fn apply(&mut self, write: &PropertyWrite) {
        self.writes.push(write.clone());
    }
}
