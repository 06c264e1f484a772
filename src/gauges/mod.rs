//! Last-known battery readings of both devices.
//!
//! [`GaugeState`] can be read from anywhere, but its fields are only
//! written from the two metric sources in this module: [`local`] owns the
//! local reading and [`remote`] owns the remote one.

pub mod local;
pub mod remote;

pub use self::local::{LocalMetricSource, SystemBattery};
pub use self::remote::{
    ErrorKind, FetchPolicy, MetricKind, RemoteMetricSource, RemoteTransport, Resolution, Ticket,
};

/// A battery charge in whole percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(u8);

impl Percent {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Converts a `0.0..=1.0` charge fraction, rounding to the nearest percent.
    pub fn from_fraction(fraction: f32) -> Option<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        Self::new((fraction * 100.0).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percent {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(value)
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a gauge shows: a value, or the `-` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reading {
    Known(Percent),
    #[default]
    Unknown,
}

impl Reading {
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(p) => write!(f, "{}", p),
            Self::Unknown => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GaugeState {
    local: Reading,
    remote: Reading,
}

impl GaugeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(&self) -> Reading {
        self.local
    }

    pub fn remote(&self) -> Reading {
        self.remote
    }
}
