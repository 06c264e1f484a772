//! The state behind the watch face.
//!
//! A [`Dashboard`] exists while the display is active. It is driven by the
//! event loop with minute ticks and fetch resolutions, and hands out
//! [`Snapshot`]s to the renderer.

use crate::gauges::{local, GaugeState, LocalMetricSource, RemoteMetricSource, Resolution};
use crate::publisher::{Publisher, Snapshot};
use crate::tick::{refresh_due, ClockSnapshot};

use chrono::Timelike;

#[derive(Debug)]
pub struct Dashboard {
    clock: ClockSnapshot,
    gauges: GaugeState,
    local: Box<dyn LocalMetricSource>,
    remote: RemoteMetricSource,
    publisher: Publisher,
}

impl Dashboard {
    /// Starts showing data at `now`, refreshing both gauges right away
    /// regardless of the schedule.
    pub fn activate<T: Timelike>(
        now: &T,
        local: Box<dyn LocalMetricSource>,
        remote: RemoteMetricSource,
    ) -> Self {
        let mut dashboard = Self {
            clock: ClockSnapshot::from_time(now),
            gauges: GaugeState::new(),
            local,
            remote,
            publisher: Publisher::default(),
        };
        log::info!("Activating at {:02}:{:02}", now.hour(), now.minute());
        dashboard.publisher.mark_dirty();
        dashboard.refresh();
        dashboard
    }

    pub fn deactivate(self) {
        log::info!(
            "Deactivating, remote source {:?} with {} request(s) pending",
            self.remote.state(),
            self.remote.pending()
        );
    }

    pub fn on_minute_tick<T: Timelike>(&mut self, time: &T) {
        self.clock = ClockSnapshot::from_time(time);
        self.publisher.mark_dirty();

        if refresh_due(self.clock.minute) {
            self.refresh();
        }
    }

    pub fn on_resolution(&mut self, resolution: Resolution) {
        if self.remote.resolve(resolution, &mut self.gauges) {
            self.publisher.mark_dirty();
        }
    }

    // local first, so the sample is on screen before the remote answers
    fn refresh(&mut self) {
        log::debug!(
            "Refreshing gauges at {:02}:{:02}",
            self.clock.hour,
            self.clock.minute
        );
        local::refresh(self.local.as_mut(), &mut self.gauges);
        self.publisher.mark_dirty();
        self.remote.request();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.clock, &self.gauges)
    }

    pub fn is_dirty(&self) -> bool {
        self.publisher.is_dirty()
    }

    /// Called by the renderer once it has drawn the current snapshot.
    pub fn take_dirty(&mut self) -> bool {
        self.publisher.take_dirty()
    }

    pub fn remote(&self) -> &RemoteMetricSource {
        &self.remote
    }
}
