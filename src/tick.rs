use chrono::{NaiveTime, Timelike};

use std::time::Duration;

/// Gauges are refreshed on every minute that is a multiple of this.
pub const REFRESH_EVERY_MINUTES: u32 = 15;

// wake up just past the boundary, never just before it
const TICK_SLACK: Duration = Duration::from_millis(5);

// a larger gap is a clock change, not a late wakeup
const MAX_CATCH_UP_MINUTES: u32 = 5;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Whether a refresh cycle is due on the tick for `minute`.
pub fn refresh_due(minute: u32) -> bool {
    minute % REFRESH_EVERY_MINUTES == 0
}

/// How long to sleep from `now` until the next minute tick.
pub fn until_next_minute<T: Timelike>(now: &T) -> Duration {
    let into_minute =
        Duration::from_secs(now.second().into()) + Duration::from_nanos(now.nanosecond().into());
    Duration::from_secs(60).saturating_sub(into_minute) + TICK_SLACK
}

fn minute_of<T: Timelike>(time: &T) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or_default()
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Hands out every wall-clock minute exactly once, however late the event
/// loop gets around to asking.
#[derive(Debug)]
pub struct MinuteTicker {
    last: NaiveTime,
}

impl MinuteTicker {
    /// `now` counts as already ticked.
    pub fn starting_at<T: Timelike>(now: &T) -> Self {
        Self {
            last: minute_of(now),
        }
    }

    /// The minutes that started since the last call, oldest first.
    pub fn due<T: Timelike>(&mut self, now: &T) -> Vec<NaiveTime> {
        let current = minute_of(now);
        let behind = (minute_of_day(current) + MINUTES_PER_DAY - minute_of_day(self.last))
            % MINUTES_PER_DAY;

        let ticks = match behind {
            0 => return Vec::new(),
            1..=MAX_CATCH_UP_MINUTES => (1..=behind)
                .map(|m| self.last + chrono::Duration::minutes(m.into()))
                .collect(),
            _ => {
                log::warn!(
                    "Clock moved from {} to {}, ticking {} only",
                    self.last.format("%H:%M"),
                    current.format("%H:%M"),
                    current.format("%H:%M")
                );
                vec![current]
            }
        };
        self.last = current;
        ticks
    }

    /// How long the event loop may sleep before asking for due minutes again.
    pub fn sleep_duration<T: Timelike>(&self, now: &T) -> Duration {
        if minute_of(now) == self.last {
            until_next_minute(now)
        } else {
            Duration::ZERO
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub hour: u32,
    pub minute: u32,
}

impl ClockSnapshot {
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn text(&self, format: ClockFormat) -> String {
        let hour = match format {
            ClockFormat::TwentyFourHour => self.hour,
            // 0 and 12 both read as 12
            ClockFormat::TwelveHour => (self.hour + 11) % 12 + 1,
        };
        format!("{:02}:{:02}", hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockFormat {
    #[default]
    TwelveHour,
    TwentyFourHour,
}
