// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Declarative update rates.
//!
//! Rates are stored as nanosecond timesteps internally: 60 updates per second
//! becomes a timestep of roughly 16.6 ms. Conversions happen once at
//! construction so the rest of the scheduler never reasons about
//! floating-point seconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Human-readable intervals that combine with a count to form a [`Rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// Per hour.
    PerHour,
    /// Per minute.
    PerMinute,
    /// Per second.
    PerSecond,
    /// Per millisecond.
    PerMillisecond,
}

impl Interval {
    fn one(self) -> Duration {
        match self {
            Interval::PerHour => Duration::from_secs(60 * 60),
            Interval::PerMinute => Duration::from_secs(60),
            Interval::PerSecond => Duration::from_secs(1),
            Interval::PerMillisecond => Duration::from_millis(1),
        }
    }
}

/// Common update rates by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePreset {
    /// 30 updates per second.
    ThirtyPerSecond,
    /// 60 updates per second.
    SixtyPerSecond,
    /// 90 updates per second.
    NinetyPerSecond,
    /// 120 updates per second.
    HundredTwentyPerSecond,
    /// An unlimited rate: fire on every frame, report interpolation 1.0.
    Unlimited,
}

/// An update rate to be used by the scheduler.
///
/// Internally either a strictly positive nanosecond timestep or the
/// unlimited sentinel (`timestep()` returns `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    timestep: Option<Duration>,
}

impl Rate {
    /// Builds a rate of `count` updates per `interval`.
    ///
    /// A count of zero or below is coerced to the default of 60 per second.
    pub fn from_count(count: i32, interval: Interval) -> Self {
        let mut rate = Rate::default();
        rate.set_count(count, interval);
        rate
    }

    /// Builds a rate from a named preset.
    pub fn from_preset(preset: RatePreset) -> Self {
        let mut rate = Rate::default();
        rate.set_preset(preset);
        rate
    }

    /// Shorthand for [`RatePreset::Unlimited`].
    pub fn unlimited() -> Self {
        Rate::from_preset(RatePreset::Unlimited)
    }

    /// Replaces the rate with `count` updates per `interval`.
    ///
    /// A count of zero or below is coerced to the default of 60 per second.
    pub fn set_count(&mut self, count: i32, interval: Interval) {
        if count <= 0 {
            self.timestep = Some(Duration::from_secs(1) / 60);
        } else {
            // Integer division can floor to zero for absurd counts; the
            // timestep must stay strictly positive.
            self.timestep = Some((interval.one() / count as u32).max(Duration::from_nanos(1)));
        }
    }

    /// Replaces the rate with a named preset.
    pub fn set_preset(&mut self, preset: RatePreset) {
        match preset {
            RatePreset::ThirtyPerSecond => self.set_count(30, Interval::PerSecond),
            RatePreset::SixtyPerSecond => self.set_count(60, Interval::PerSecond),
            RatePreset::NinetyPerSecond => self.set_count(90, Interval::PerSecond),
            RatePreset::HundredTwentyPerSecond => self.set_count(120, Interval::PerSecond),
            RatePreset::Unlimited => self.timestep = None,
        }
    }

    /// The nanosecond timestep between updates, or `None` for an unlimited
    /// rate.
    pub fn timestep(&self) -> Option<Duration> {
        self.timestep
    }

    /// True if this rate is the unlimited sentinel.
    pub fn is_unlimited(&self) -> bool {
        self.timestep.is_none()
    }
}

impl Default for Rate {
    /// Defaults to 60 updates per second.
    fn default() -> Self {
        Rate {
            timestep: Some(Duration::from_secs(1) / 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_their_counts() {
        assert_eq!(
            Rate::from_preset(RatePreset::ThirtyPerSecond).timestep(),
            Some(Duration::from_secs(1) / 30)
        );
        assert_eq!(
            Rate::from_preset(RatePreset::SixtyPerSecond).timestep(),
            Some(Duration::from_secs(1) / 60)
        );
        assert_eq!(
            Rate::from_preset(RatePreset::NinetyPerSecond).timestep(),
            Some(Duration::from_secs(1) / 90)
        );
        assert_eq!(
            Rate::from_preset(RatePreset::HundredTwentyPerSecond).timestep(),
            Some(Duration::from_secs(1) / 120)
        );
    }

    #[test]
    fn unlimited_preset_is_the_sentinel() {
        let rate = Rate::from_preset(RatePreset::Unlimited);
        assert_eq!(rate.timestep(), None);
        assert!(rate.is_unlimited());
        assert_eq!(rate, Rate::unlimited());
    }

    #[test]
    fn count_and_interval_divide_the_interval() {
        let rate = Rate::from_count(4, Interval::PerSecond);
        assert_eq!(rate.timestep(), Some(Duration::from_millis(250)));

        let rate = Rate::from_count(2, Interval::PerMinute);
        assert_eq!(rate.timestep(), Some(Duration::from_secs(30)));

        let rate = Rate::from_count(10, Interval::PerMillisecond);
        assert_eq!(rate.timestep(), Some(Duration::from_micros(100)));

        let rate = Rate::from_count(3600, Interval::PerHour);
        assert_eq!(rate.timestep(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn non_positive_counts_coerce_to_default() {
        assert_eq!(Rate::from_count(0, Interval::PerSecond), Rate::default());
        assert_eq!(Rate::from_count(-5, Interval::PerMinute), Rate::default());
    }

    #[test]
    fn absurd_counts_keep_the_timestep_positive() {
        let rate = Rate::from_count(2_000_000, Interval::PerMillisecond);
        assert_eq!(rate.timestep(), Some(Duration::from_nanos(1)));
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut rate = Rate::unlimited();
        rate.set_count(120, Interval::PerSecond);
        assert_eq!(rate.timestep(), Some(Duration::from_secs(1) / 120));

        rate.set_preset(RatePreset::Unlimited);
        assert!(rate.is_unlimited());
    }

    #[test]
    fn default_is_sixty_per_second() {
        assert_eq!(
            Rate::default(),
            Rate::from_preset(RatePreset::SixtyPerSecond)
        );
    }
}
