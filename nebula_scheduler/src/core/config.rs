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

//! Scheduler configuration.
//!
//! A config describes a current or desired tuning of a scheduler. Out-of-range
//! inputs are not errors; they are coerced by [`SchedulerConfig::sanitized`]
//! the moment a config is handed to the scheduler. "Fixed timestepping", where
//! every frame reportedly takes exactly the same amount of time, can be had by
//! setting the interpolation cap to 1.0.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;

use crate::core::rate::Rate;

/// Errors raised when loading or saving a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    Io(std::io::Error),
    /// The text was not a valid scheduler configuration.
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config file error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

/// Tuning for a [`Scheduler`](crate::core::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// The update rate of the scheduler itself. Scheduled items cannot be
    /// updated faster than this. Unlimited and very high rates are supported
    /// but not recommended.
    pub master_rate: Rate,

    /// The maximum interpolation value reported to items. Any value below 1.0
    /// disables capping. Large caps (above 2.0) can produce unusual effects in
    /// time-dependent systems such as physics simulations.
    pub interpolation_cap: f64,

    /// The interpolation above which a frame of execution is counted as
    /// delayed. Suggested values lie between 1.05 and 1.10; the minimum is
    /// 1.01.
    pub lag_threshold: f64,

    /// Minimum number of seconds between successive
    /// [`SchedulerEvent::FallingBehind`](crate::event::SchedulerEvent) events.
    /// Zero disables the event entirely.
    pub lag_warning_interval_secs: u32,

    /// When true, items asking for a stop via their request flag are counted
    /// but cannot stop the loop. A refused request leaves the item's flag set,
    /// so the refusal counter keeps growing each frame until the item clears
    /// its own flag.
    pub refuse_stop_requests: bool,
}

impl SchedulerConfig {
    /// Returns a copy with out-of-range fields coerced into contract:
    ///
    /// * `interpolation_cap < 1.0` becomes [`f64::MAX`], so the per-item
    ///   `min(interpolation, cap)` never clamps.
    /// * `lag_threshold <= 1.0` becomes `1.01`, so an on-time frame is never
    ///   counted as delayed.
    ///
    /// All other fields are copied verbatim.
    pub fn sanitized(mut self) -> Self {
        if self.interpolation_cap < 1.0 {
            self.interpolation_cap = f64::MAX;
        }
        if self.lag_threshold <= 1.0 {
            self.lag_threshold = 1.01;
        }
        self
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }

    /// Writes this configuration to a JSON file, pretty-printed.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(ConfigError::Parse)?;
        fs::write(path, text).map_err(ConfigError::Io)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            master_rate: Rate::default(),
            interpolation_cap: 1.1,
            lag_threshold: 1.025,
            lag_warning_interval_secs: 10,
            refuse_stop_requests: true,
        }
    }
}
