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

//! The scheduler: a time-keeping and automatic update delivery system.
//!
//! [`Scheduler::start`] runs the main loop on the calling thread until the
//! loop is stopped, delivering `on_update` calls to registered items at their
//! requested rates, sleeping off any spare frame budget, measuring drift and
//! publishing lifecycle/health events to listeners.
//!
//! The scheduler is not thread-safe. All function calls should occur on a
//! single thread.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::core::config::SchedulerConfig;
use crate::core::rate::Rate;
use crate::core::registry::{ItemRegistry, ListenerRegistry};
use crate::core::stats::ExecutionData;
use crate::core::time_info::TimeInfo;
use crate::core::timer::{Clock, MonotonicClock, Sleeper, ThreadSleeper};
use crate::event::{ListenerHandle, SchedulerEvent};
use crate::item::ItemHandle;

/// Fraction of the master timestep trimmed from every sleep request. Thread
/// wake-up tends to run late by roughly this much, so the trim moves the
/// average wake closer to the intended time. Sleeps shorter than the trim are
/// skipped outright.
const SLEEP_TRIM: f64 = 0.025;

/// A cooperative handle onto a scheduler's running flag.
///
/// [`Scheduler::start`] blocks, and the borrow checker keeps callbacks from
/// reaching back into the scheduler mid-run, so items and listeners that want
/// to end the loop capture one of these beforehand and call
/// [`stop`](StopHandle::stop) from inside their callbacks. The handle does
/// not keep the scheduler alive; stopping an already-dropped scheduler is a
/// no-op.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Weak<Cell<bool>>,
}

impl StopHandle {
    /// Stops the scheduler after the current frame concludes. No effect if
    /// the loop is not running or the scheduler no longer exists.
    pub fn stop(&self) {
        if let Some(flag) = self.running.upgrade() {
            flag.set(false);
        }
    }

    /// True while the scheduler's loop is executing.
    pub fn is_running(&self) -> bool {
        self.running.upgrade().map(|flag| flag.get()).unwrap_or(false)
    }
}

/// A single-threaded cooperative scheduler.
///
/// Items and listeners are registered as shared handles; the scheduler never
/// mutates them beyond clearing request flags it has honored, and removal
/// matches by handle identity. Registration order is preserved and defines
/// the visitation order within every frame.
///
/// Two item-side contracts are worth calling out:
///
/// * A refused stop request (see
///   [`SchedulerConfig::refuse_stop_requests`]) is counted but the item's
///   stop flag is left raised, so
///   [`ExecutionData::refused_stop_requests`] keeps growing each frame until
///   the item clears its own flag.
/// * Honoring a skip request clears *both* of the item's flags. The stop flag
///   is checked first, so with refusal off a stop raised together with a skip
///   is honored; with refusal on, the skip wipes the refused stop request.
pub struct Scheduler {
    running: Rc<Cell<bool>>,
    execution_data: ExecutionData,
    active_config: SchedulerConfig,
    pending_config: SchedulerConfig,
    items: ItemRegistry,
    listeners: ListenerRegistry,
    last_lag_warning: Option<Duration>,
    clock: Box<dyn Clock>,
    sleeper: Box<dyn Sleeper>,
}

impl Scheduler {
    /// Creates a scheduler with the default configuration, driven by the
    /// system clock.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a scheduler with the given configuration, driven by the
    /// system clock. The configuration is sanitized on the way in.
    pub fn with_config(config: SchedulerConfig) -> Self {
        let config = config.sanitized();
        Scheduler {
            running: Rc::new(Cell::new(false)),
            execution_data: ExecutionData::default(),
            active_config: config,
            pending_config: config,
            items: ItemRegistry::default(),
            listeners: ListenerRegistry::default(),
            last_lag_warning: None,
            clock: Box::new(MonotonicClock::new()),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replaces the time source. Intended for tests and deterministic
    /// simulations.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the sleep primitive. Intended for tests and deterministic
    /// simulations.
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Stores a sanitized copy of `config` as the pending configuration. The
    /// change takes effect the next time the scheduler is started.
    pub fn set_config(&mut self, config: SchedulerConfig) {
        self.pending_config = config.sanitized();
    }

    /// The configuration the loop is (or was last) running with.
    pub fn active_config(&self) -> SchedulerConfig {
        self.active_config
    }

    /// The configuration that will be applied at the next start.
    pub fn pending_config(&self) -> SchedulerConfig {
        self.pending_config
    }

    /// Counters for the current (or most recent) run.
    pub fn execution_data(&self) -> ExecutionData {
        self.execution_data
    }

    /// True while the loop is executing inside [`start`](Scheduler::start).
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// A handle items and listeners can capture to stop the loop from inside
    /// their callbacks.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Rc::downgrade(&self.running),
        }
    }

    /// Stops the scheduler after the current frame concludes. Not thread
    /// safe; meant for callers on the scheduler's own thread. No effect if
    /// the loop is not running.
    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Registers `item` to be updated at `rate`. Duplicate registrations are
    /// permitted; adding while the loop runs is legal and the item is picked
    /// up no later than the next frame.
    pub fn add_item(&mut self, item: ItemHandle, rate: Rate) {
        let last_update = if self.running.get() {
            self.clock.now()
        } else {
            Duration::ZERO
        };
        self.items.add(item, rate.timestep(), last_update);
    }

    /// Removes the first registration of `item`. Returns false if the item
    /// was not registered.
    pub fn remove_item(&mut self, item: &ItemHandle) -> bool {
        self.items.remove(item)
    }

    /// True if `item` is currently registered.
    pub fn has_item(&self, item: &ItemHandle) -> bool {
        self.items.contains(item)
    }

    /// Registers a listener for scheduler events.
    pub fn add_listener(&mut self, listener: ListenerHandle) {
        self.listeners.add(listener);
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, listener: &ListenerHandle) -> bool {
        self.listeners.remove(listener)
    }

    /// True if `listener` is currently registered.
    pub fn has_listener(&self, listener: &ListenerHandle) -> bool {
        self.listeners.contains(listener)
    }

    /// Starts the scheduler, applying the pending configuration and zeroing
    /// the execution data. Blocks until the loop is stopped, either by an
    /// item's honored stop request or by [`stop`](Scheduler::stop) /
    /// [`StopHandle::stop`] from inside a callback.
    ///
    /// A panic raised by any item or listener callback propagates out of this
    /// function; the loop makes no recovery attempt.
    pub fn start(&mut self) {
        self.running.set(true);
        self.execution_data.reset();

        // Apply the pending configuration.
        self.active_config = self.pending_config;
        let lag_warning_interval =
            Duration::from_secs(u64::from(self.active_config.lag_warning_interval_secs));
        self.last_lag_warning = None;

        let master_step = self.active_config.master_rate.timestep();
        let sleep_skip_threshold = master_step
            .map(|step| Duration::from_nanos((step.as_nanos() as f64 * SLEEP_TRIM).round() as u64));

        log::info!(
            "scheduler starting: {} item(s), master timestep {:?}",
            self.items.len(),
            master_step
        );

        self.listeners.broadcast(SchedulerEvent::Started);

        let now = self.clock.now();
        let mut info = TimeInfo {
            epoch: now,
            since_epoch: Duration::ZERO,
            frame_start: now,
            now,
            since_last_update: Duration::ZERO,
            interpolation: 1.0,
        };

        // Announce the start to items.
        for entry in self.items.iter_mut() {
            entry.item.borrow_mut().on_scheduler_start(&info);
        }

        // Backdate each item's last update by one timestep so the first
        // frame reports an interpolation near 1.0 rather than 0.
        let mut frame_start = self.clock.now();
        for entry in self.items.iter_mut() {
            entry.state.last_update = match entry.state.timestep {
                Some(step) => frame_start.saturating_sub(step),
                None => frame_start,
            };
        }

        while self.running.get() {
            frame_start = self.clock.now();
            info.frame_start = frame_start;

            for entry in self.items.iter_mut() {
                if entry.item.borrow().flags().stop_requested() {
                    if self.active_config.refuse_stop_requests {
                        // The flag is left raised; clearing it is the
                        // item's job.
                        self.execution_data.refused_stop_requests += 1;
                    } else {
                        entry.item.borrow().flags().reset();
                        self.running.set(false);
                        break;
                    }
                }

                if entry.item.borrow().flags().skip_requested() {
                    self.execution_data.skipped_update_calls += 1;
                    entry.item.borrow().flags().reset();
                    continue;
                }

                info.now = self.clock.now();
                info.since_epoch = info.now.saturating_sub(info.epoch);
                info.since_last_update = info.now.saturating_sub(entry.state.last_update);
                info.interpolation = match entry.state.timestep {
                    None => 1.0,
                    Some(step) => {
                        let raw =
                            info.since_last_update.as_nanos() as f64 / step.as_nanos() as f64;
                        raw.min(self.active_config.interpolation_cap)
                    }
                };

                // Strict comparison: a frame starting exactly on the item's
                // deadline does not fire. On the first frame after start the
                // deadline is zero, so every item fires.
                if entry.state.timestep.is_none() || frame_start > entry.state.next_frame {
                    entry.item.borrow_mut().on_update(&info);
                    if let Some(step) = entry.state.timestep {
                        entry.state.next_frame = frame_start + step;
                    }
                    entry.state.last_update = frame_start;
                }
            }

            // End of frame: sleep off any spare budget, then measure how
            // long the frame really took. With an unlimited master rate
            // there is no frame budget and no lag bookkeeping.
            if let (Some(step), Some(skip_threshold)) = (master_step, sleep_skip_threshold) {
                let frame_end = frame_start + step;
                let remaining = frame_end.saturating_sub(self.clock.now());
                if remaining > Duration::ZERO {
                    if remaining > skip_threshold {
                        self.sleeper.sleep(remaining - skip_threshold);
                    }

                    // Even with spare time the wake-up may have been late.
                    let frame_time = self.clock.now().saturating_sub(frame_start);
                    let frame_interpolation = (frame_time.as_nanos() as f64
                        / step.as_nanos() as f64)
                        .min(self.active_config.interpolation_cap);
                    if frame_interpolation > self.active_config.lag_threshold {
                        self.execution_data.frames_delayed_total += 1;
                        self.execution_data.frames_delayed_thread_wake += 1;
                    }
                } else {
                    let frame_time = self.clock.now().saturating_sub(frame_start);
                    let frame_interpolation = (frame_time.as_nanos() as f64
                        / step.as_nanos() as f64)
                        .min(self.active_config.interpolation_cap);
                    if frame_interpolation > self.active_config.lag_threshold {
                        self.execution_data.frames_delayed_total += 1;

                        if self.active_config.lag_warning_interval_secs > 0 {
                            let now = self.clock.now();
                            let cooled_down = match self.last_lag_warning {
                                None => true,
                                Some(last) => now.saturating_sub(last) >= lag_warning_interval,
                            };
                            if cooled_down {
                                log::warn!(
                                    "scheduler falling behind: frame interpolation {frame_interpolation:.3}"
                                );
                                self.listeners.broadcast(SchedulerEvent::FallingBehind);
                                self.last_lag_warning = Some(self.clock.now());
                            }
                        }
                    }
                }
            }

            self.execution_data.frames_executed += 1;
        }

        info.now = self.clock.now();
        info.since_epoch = info.now.saturating_sub(info.epoch);
        info.interpolation = 1.0;

        // Announce the stop to items, then listeners.
        for entry in self.items.iter_mut() {
            entry.item.borrow_mut().on_scheduler_stop(&info);
        }
        self.listeners.broadcast(SchedulerEvent::Stopped);

        log::info!(
            "scheduler stopped after {} frame(s)",
            self.execution_data.frames_executed
        );
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::core::rate::RatePreset;
    use crate::core::timer::{VirtualClock, VirtualSleeper};
    use crate::item::{RequestFlags, ScheduledItem};
    use approx::assert_relative_eq;

    /// Stops the scheduler through a [`StopHandle`] after a fixed number of
    /// updates.
    struct StopAfter {
        flags: RequestFlags,
        remaining: u32,
        handle: StopHandle,
    }

    impl StopAfter {
        fn register(scheduler: &mut Scheduler, updates: u32) {
            let item = Rc::new(RefCell::new(StopAfter {
                flags: RequestFlags::new(),
                remaining: updates,
                handle: scheduler.stop_handle(),
            }));
            scheduler.add_item(item, Rate::unlimited());
        }
    }

    impl ScheduledItem for StopAfter {
        fn flags(&self) -> &RequestFlags {
            &self.flags
        }

        fn on_update(&mut self, _info: &TimeInfo) {
            if self.remaining > 0 {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.handle.stop();
                }
            }
        }
    }

    /// A scheduler on virtual time. The clock starts slightly past zero so
    /// the first frame's start time is nonzero, as with a real clock, and the
    /// sleeper overshoots slightly as real OS timers do.
    fn virtual_scheduler(config: SchedulerConfig) -> (Scheduler, VirtualClock) {
        let clock = VirtualClock::new();
        clock.advance(Duration::from_millis(1));
        let sleeper = VirtualSleeper::with_oversleep(clock.clone(), Duration::from_micros(500));
        let scheduler = Scheduler::with_config(config)
            .with_clock(Box::new(clock.clone()))
            .with_sleeper(Box::new(sleeper));
        (scheduler, clock)
    }

    #[test]
    fn set_config_updates_only_the_pending_config() {
        let mut scheduler = Scheduler::new();
        let mut config = SchedulerConfig::default();
        config.lag_warning_interval_secs = 42;
        scheduler.set_config(config);

        assert_eq!(scheduler.pending_config().lag_warning_interval_secs, 42);
        assert_eq!(scheduler.active_config().lag_warning_interval_secs, 10);
    }

    #[test]
    fn set_config_sanitizes_on_the_way_in() {
        let mut scheduler = Scheduler::new();
        let mut config = SchedulerConfig::default();
        config.interpolation_cap = 0.25;
        config.lag_threshold = 0.9;
        scheduler.set_config(config);

        assert_relative_eq!(scheduler.pending_config().interpolation_cap, f64::MAX);
        assert_relative_eq!(scheduler.pending_config().lag_threshold, 1.01);
    }

    #[test]
    fn pending_config_becomes_active_at_start() {
        let (mut scheduler, _clock) = virtual_scheduler(SchedulerConfig::default());
        let mut config = SchedulerConfig::default();
        config.lag_warning_interval_secs = 7;
        scheduler.set_config(config);
        assert_eq!(scheduler.active_config().lag_warning_interval_secs, 10);

        StopAfter::register(&mut scheduler, 1);
        scheduler.start();

        assert_eq!(scheduler.active_config().lag_warning_interval_secs, 7);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn execution_data_is_zeroed_at_every_start() {
        let (mut scheduler, _clock) = virtual_scheduler(SchedulerConfig::default());
        StopAfter::register(&mut scheduler, 3);
        scheduler.start();
        assert_eq!(scheduler.execution_data().frames_executed, 3);

        StopAfter::register(&mut scheduler, 1);
        scheduler.start();
        // Not 3 + 1: the counters restart from zero. Both stoppers fire on
        // the single frame of the second run.
        assert_eq!(scheduler.execution_data().frames_executed, 1);
    }

    #[test]
    fn stop_handle_outliving_its_scheduler_is_inert() {
        let scheduler = Scheduler::new();
        let handle = scheduler.stop_handle();
        assert!(!handle.is_running());
        drop(scheduler);
        handle.stop();
        assert!(!handle.is_running());
    }

    #[test]
    fn item_surface_matches_registry_semantics() {
        let mut scheduler = Scheduler::new();
        let item: ItemHandle = Rc::new(RefCell::new(StopAfter {
            flags: RequestFlags::new(),
            remaining: 1,
            handle: scheduler.stop_handle(),
        }));

        assert!(!scheduler.has_item(&item));
        assert!(!scheduler.remove_item(&item));

        scheduler.add_item(item.clone(), Rate::from_preset(RatePreset::SixtyPerSecond));
        assert!(scheduler.has_item(&item));
        assert!(scheduler.remove_item(&item));
        assert!(!scheduler.has_item(&item));
    }

    #[test]
    fn stop_on_an_idle_scheduler_is_a_no_op() {
        let scheduler = Scheduler::new();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
