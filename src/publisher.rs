use crate::gauges::{GaugeState, Reading};
use crate::tick::ClockSnapshot;

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub clock: ClockSnapshot,
    pub local: Reading,
    pub remote: Reading,
}

impl Snapshot {
    pub fn new(clock: ClockSnapshot, gauges: &GaugeState) -> Self {
        Self {
            clock,
            local: gauges.local(),
            remote: gauges.remote(),
        }
    }
}

/// Collapses any number of change notifications into a single redraw.
#[derive(Debug, Default)]
pub struct Publisher {
    dirty: bool,
}

impl Publisher {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the flag, returning whether a redraw was pending.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
