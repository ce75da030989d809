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

//! `core` module – the runtime nucleus.
//!
//! Contents:
//! * [`scheduler`]: the main loop (frame windows, update dispatch, sleep,
//!   drift measurement, event publication)
//! * [`rate`]: declarative update rates & the unlimited sentinel
//! * [`config`]: scheduler tuning, input sanitization, JSON helpers
//! * [`stats`]: per-run execution counters
//! * [`timer`]: clock & sleep abstractions (`MonotonicClock`,
//!   `VirtualClock` for deterministic tests)
//! * [`time_info`]: the time snapshot handed to items each update

pub mod config;
pub mod rate;
pub mod scheduler;
pub mod stats;
pub mod time_info;
pub mod timer;

pub(crate) mod registry;
