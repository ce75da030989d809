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

//! The time snapshot handed to scheduled items.

use std::time::Duration;

/// Timing information as reported by the scheduler.
///
/// All values are readings of the scheduler's [`Clock`](crate::core::timer::Clock)
/// (durations since the clock's arbitrary origin) or differences of such
/// readings. `epoch`, `since_epoch` and `frame_start` are constant across all
/// items updated within one frame; `now`, `since_last_update` and
/// `interpolation` are recomputed for each item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInfo {
    /// The time at which the scheduler began executing.
    pub epoch: Duration,

    /// Elapsed time since the scheduler began executing.
    pub since_epoch: Duration,

    /// The time at the start of the current frame of execution (a frame is
    /// 16.6 ms when running at 60 updates per second).
    pub frame_start: Duration,

    /// The time now.
    pub now: Duration,

    /// Time since the last update call delivered to this item.
    pub since_last_update: Duration,

    /// The difference between the expected and the actual call time as a
    /// multiplicative factor: 1.15 means this call arrived 15% later than
    /// intended. Capped at the configured interpolation cap; always exactly
    /// 1.0 for items scheduled at an unlimited rate.
    pub interpolation: f64,
}
