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

//! Nebula Scheduler Crate
//!
//! A time-keeping and automatic update delivery system: a single-threaded
//! cooperative scheduler that periodically updates a set of registered items
//! at configurable per-item rates, bounded by a master frame rate, and
//! reports lifecycle and health events to listeners.
//!
//! Main modules:
//! * [`core`]: the runtime nucleus (scheduler loop, rates, config, stats,
//!   timing primitives)
//! * [`event`]: scheduler event kinds & the listener trait
//! * [`item`]: the scheduled item trait & per-item request flags
//!
//! The scheduler is not thread-safe. All calls (registration, configuration,
//! [`Scheduler::start`], [`Scheduler::stop`]) must occur on a single thread.
//! Items and listeners run on the thread that called `start()`; a long-running
//! update shows up as sustained lag events rather than starvation.
//!
//! Quick design guidelines:
//! * Items cooperate: they return promptly from `on_update` and use their
//!   request flags (or a [`StopHandle`]) to influence the loop.
//! * Avoid panics outside tests; a panic in any callback propagates out of
//!   `start()` with no recovery attempt.
//! * Time comes from a pluggable [`Clock`]; tests and deterministic
//!   simulations substitute a [`VirtualClock`].

pub mod core;
pub mod event;
pub mod item;

pub use crate::core::config::{ConfigError, SchedulerConfig};
pub use crate::core::rate::{Interval, Rate, RatePreset};
pub use crate::core::scheduler::{Scheduler, StopHandle};
pub use crate::core::stats::ExecutionData;
pub use crate::core::time_info::TimeInfo;
pub use crate::core::timer::{
    Clock, MonotonicClock, Sleeper, ThreadSleeper, VirtualClock, VirtualSleeper,
};
pub use crate::event::{ListenerHandle, SchedulerEvent, SchedulerListener};
pub use crate::item::{ItemHandle, RequestFlags, ScheduledItem};
