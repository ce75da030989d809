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

//! Timing primitives: the scheduler's two external collaborators, time and
//! sleep, behind small traits so tests and deterministic simulations can
//! substitute a virtual clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic nanosecond-resolution time source.
///
/// `now()` is measured from an arbitrary fixed origin and must never
/// decrease. It is expected to be cheap: the scheduler calls it several times
/// per item per frame.
pub trait Clock {
    /// Elapsed time since this clock's origin.
    fn now(&self) -> Duration;
}

/// Blocks the current thread for at least the requested duration.
///
/// OS sleeps commonly overshoot by tens to hundreds of microseconds; the
/// scheduler trims its sleep requests to compensate.
pub trait Sleeper {
    /// Blocks for at least `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production [`Clock`] backed by [`Instant`]. The origin is the moment of
/// construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose origin is now.
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Production [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A manually driven clock for tests and deterministic simulations.
///
/// Clones share the same underlying counter, so a clock handed to the
/// scheduler can still be advanced from inside an item's update callback.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ns: Rc<Cell<u64>>,
}

impl VirtualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        VirtualClock::default()
    }

    /// The current reading in nanoseconds.
    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ns.set(self.now_ns.get() + by.as_nanos() as u64);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns.get())
    }
}

/// A [`Sleeper`] that advances a [`VirtualClock`] instead of blocking.
///
/// With no oversleep configured the sleep is perfectly punctual, which real
/// OS timers never are; `with_oversleep` models the typical overshoot so that
/// simulated frames line up with real scheduler behavior.
#[derive(Debug, Clone)]
pub struct VirtualSleeper {
    clock: VirtualClock,
    oversleep: Duration,
}

impl VirtualSleeper {
    /// A punctual sleeper over `clock`.
    pub fn new(clock: VirtualClock) -> Self {
        VirtualSleeper {
            clock,
            oversleep: Duration::ZERO,
        }
    }

    /// A sleeper that wakes `oversleep` after the requested deadline.
    pub fn with_oversleep(clock: VirtualClock, oversleep: Duration) -> Self {
        VirtualSleeper { clock, oversleep }
    }
}

impl Sleeper for VirtualSleeper {
    fn sleep(&self, duration: Duration) {
        self.clock.advance(duration + self.oversleep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SLEEP_DURATION_MS: u64 = 50;
    const SLEEP_MARGIN_MS: u64 = 200;

    #[test]
    fn monotonic_clock_never_goes_backward() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn monotonic_clock_tracks_real_sleep() {
        let clock = MonotonicClock::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        let elapsed = clock.now();
        assert!(
            elapsed >= Duration::from_millis(SLEEP_DURATION_MS),
            "elapsed ({elapsed:?}) should cover the sleep"
        );
        assert!(
            elapsed < Duration::from_millis(SLEEP_DURATION_MS + SLEEP_MARGIN_MS),
            "elapsed ({elapsed:?}) should stay within the margin"
        );
    }

    #[test]
    fn thread_sleeper_blocks_for_at_least_the_request() {
        let clock = MonotonicClock::new();
        ThreadSleeper.sleep(Duration::from_millis(SLEEP_DURATION_MS));
        assert!(clock.now() >= Duration::from_millis(SLEEP_DURATION_MS));
    }

    #[test]
    fn virtual_clock_only_moves_when_advanced() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(16));
        assert_eq!(clock.now_ns(), 16_000_000);
    }

    #[test]
    fn virtual_clock_clones_share_time() {
        let clock = VirtualClock::new();
        let observer = clock.clone();
        clock.advance(Duration::from_secs(1));
        assert_eq!(observer.now(), Duration::from_secs(1));
    }

    #[test]
    fn virtual_sleeper_advances_its_clock() {
        let clock = VirtualClock::new();
        let sleeper = VirtualSleeper::new(clock.clone());
        sleeper.sleep(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn virtual_sleeper_oversleep_is_added_to_every_sleep() {
        let clock = VirtualClock::new();
        let sleeper = VirtualSleeper::with_oversleep(clock.clone(), Duration::from_micros(500));
        sleeper.sleep(Duration::from_millis(10));
        sleeper.sleep(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(21));
    }
}
