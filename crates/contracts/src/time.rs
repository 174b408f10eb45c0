//! Simulated time: minutes since the scenario epoch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simulated minutes advanced per engine tick, unless overridden in config.
pub const TICK_MINUTES: u64 = 10;

pub const MINUTES_PER_DAY: u64 = 1440;

/// A point in simulated time, counted in whole minutes from the scenario
/// epoch (day 0, 00:00).
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct SimTime(u64);

impl SimTime {
    pub fn from_minutes(minutes: u64) -> Self {
        Self(minutes)
    }

    pub fn as_minutes(&self) -> u64 {
        self.0
    }

    pub fn plus_minutes(&self, minutes: u64) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// Minutes elapsed since `earlier`. Saturates to zero when `earlier` is
    /// actually in the future.
    pub fn minutes_between(&self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Fractional hours elapsed since `earlier`, floored at zero.
    pub fn hours_since(&self, earlier: SimTime) -> f64 {
        self.minutes_between(earlier) as f64 / 60.0
    }

    /// Minutes into the current day, in `[0, MINUTES_PER_DAY)`.
    pub fn time_of_day(&self) -> u64 {
        self.0 % MINUTES_PER_DAY
    }

    pub fn day_index(&self) -> u64 {
        self.0 / MINUTES_PER_DAY
    }

    /// Clock rendering, e.g. `"08:30"`.
    pub fn hhmm(&self) -> String {
        let tod = self.time_of_day();
        format!("{:02}:{:02}", tod / 60, tod % 60)
    }

    /// Human-readable date label, e.g. `"day 2"`.
    pub fn date_string(&self) -> String {
        format!("day {}", self.day_index())
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_string(), self.hhmm())
    }
}
