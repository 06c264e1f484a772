use super::{GaugeState, Percent, Reading};
use crate::Error;

use systemstat::{Platform, System};

/// Synchronous access to this device's battery.
pub trait LocalMetricSource: std::fmt::Debug {
    fn sample(&mut self) -> Result<Percent, Error>;
}

/// Reads the host battery through the platform's power supply interface.
pub struct SystemBattery {
    sys: System,
}

impl SystemBattery {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl std::fmt::Debug for SystemBattery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SystemBattery")
    }
}

impl LocalMetricSource for SystemBattery {
    fn sample(&mut self) -> Result<Percent, Error> {
        let life = self.sys.battery_life()?;
        Percent::from_fraction(life.remaining_capacity).ok_or_else(|| {
            format!(
                "battery reported an invalid capacity: {}",
                life.remaining_capacity
            )
            .into()
        })
    }
}

/// Samples `source` and stores the result as the local reading.
///
/// A failed sample leaves the gauge `Unknown` instead of showing a stale value.
pub fn refresh(source: &mut dyn LocalMetricSource, state: &mut GaugeState) {
    state.local = match source.sample() {
        Ok(percent) => Reading::Known(percent),
        Err(e) => {
            log::warn!("Could not sample local battery from {:?}: {}", source, e);
            Reading::Unknown
        }
    };
}
