use super::{GaugeState, Percent, Reading};

use std::str::FromStr;

/// Which value to ask the paired device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    BatteryPercent,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::BatteryPercent => "battery_percent",
        }
    }
}

/// Identifies one issued request so its resolution can be matched back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Why a remote fetch failed. Only ever logged and kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    PeerUnavailable,
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Transport => "transport failure",
                Self::Protocol => "protocol error",
                Self::PeerUnavailable => "peer unavailable",
                Self::Timeout => "timed out",
            }
        )
    }
}

/// The single outcome of one request, delivered back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub ticket: Ticket,
    pub outcome: Result<Percent, ErrorKind>,
}

/// Starts a fetch and returns right away.
///
/// Implementations must eventually produce exactly one [`Resolution`] for
/// `ticket` on the channel they were built with.
pub trait RemoteTransport: std::fmt::Debug {
    fn request(&mut self, kind: MetricKind, ticket: Ticket);
}

/// What to do when a refresh comes due while a request is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Abandon the pending request; only the newest one may update the gauge.
    #[default]
    Supersede,
    /// Keep every request alive; whichever resolves last wins.
    Overlap,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supersede" => Ok(Self::Supersede),
            "overlap" => Ok(Self::Overlap),
            unknown => Err(format!("{} is not a known fetch policy", unknown)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Requesting,
}

#[derive(Debug)]
pub struct RemoteMetricSource {
    transport: Box<dyn RemoteTransport>,
    policy: FetchPolicy,
    pending: Vec<Ticket>,
    next_ticket: u64,
    last_error: Option<ErrorKind>,
}

impl RemoteMetricSource {
    pub fn new(transport: Box<dyn RemoteTransport>, policy: FetchPolicy) -> Self {
        Self {
            transport,
            policy,
            pending: Vec::with_capacity(1),
            next_ticket: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> FetchState {
        if self.pending.is_empty() {
            FetchState::Idle
        } else {
            FetchState::Requesting
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Issues a request for the remote battery level. Never waits for it.
    pub fn request(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        if self.policy == FetchPolicy::Supersede {
            for abandoned in self.pending.drain(..) {
                log::warn!("Remote request {:?} still pending, superseding it", abandoned);
            }
        }
        self.pending.push(ticket);

        log::debug!("Requesting remote battery level as {:?}", ticket);
        self.transport.request(MetricKind::BatteryPercent, ticket);
        ticket
    }

    /// Applies a finished request to `state`.
    ///
    /// Returns whether the remote reading was written. Resolutions for
    /// requests that are no longer pending are dropped.
    pub fn resolve(&mut self, resolution: Resolution, state: &mut GaugeState) -> bool {
        let Some(index) = self.pending.iter().position(|t| *t == resolution.ticket) else {
            log::debug!(
                "Dropping resolution of {:?}, it is no longer pending",
                resolution.ticket
            );
            return false;
        };
        self.pending.remove(index);

        state.remote = match resolution.outcome {
            Ok(percent) => Reading::Known(percent),
            Err(kind) => {
                log::error!("Remote battery level unavailable: {}", kind);
                self.last_error = Some(kind);
                Reading::Unknown
            }
        };
        true
    }
}
