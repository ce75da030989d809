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

//! Sandbox example driving the Nebula scheduler.
//!
//! A small "simulation" runs at the master rate while a telemetry probe
//! samples it twice a second; a listener reports scheduler health. The run
//! stops itself after five seconds of simulated play.

use std::cell::RefCell;
use std::rc::Rc;

use nebula_scheduler::{
    Interval, Rate, RatePreset, RequestFlags, ScheduledItem, Scheduler, SchedulerConfig,
    SchedulerEvent, SchedulerListener, StopHandle, TimeInfo,
};

/// A one-dimensional ball bouncing between two walls, stepped at 60 Hz.
struct BouncingBall {
    flags: RequestFlags,
    position: f64,
    velocity: f64,
    updates: u64,
    budget: u64,
    handle: StopHandle,
}

impl BouncingBall {
    fn new(handle: StopHandle, budget: u64) -> Self {
        BouncingBall {
            flags: RequestFlags::new(),
            position: 0.0,
            velocity: 42.0,
            updates: 0,
            budget,
            handle,
        }
    }
}

impl ScheduledItem for BouncingBall {
    fn flags(&self) -> &RequestFlags {
        &self.flags
    }

    fn on_update(&mut self, info: &TimeInfo) {
        // Scale the fixed step by the reported interpolation so a late call
        // advances the ball proportionally further.
        let dt = (1.0 / 60.0) * info.interpolation;
        self.position += self.velocity * dt;
        if !(0.0..=100.0).contains(&self.position) {
            self.velocity = -self.velocity;
            self.position = self.position.clamp(0.0, 100.0);
        }

        self.updates += 1;
        if self.updates >= self.budget {
            self.handle.stop();
        }
    }

    fn on_scheduler_start(&mut self, _info: &TimeInfo) {
        log::info!("ball entering play");
    }

    fn on_scheduler_stop(&mut self, _info: &TimeInfo) {
        log::info!("ball leaving play at {:.2}", self.position);
    }
}

/// Samples the simulation twice a second.
struct TelemetryProbe {
    flags: RequestFlags,
    ball: Rc<RefCell<BouncingBall>>,
}

impl ScheduledItem for TelemetryProbe {
    fn flags(&self) -> &RequestFlags {
        &self.flags
    }

    fn on_update(&mut self, info: &TimeInfo) {
        log::info!(
            "t={:>6.2}s ball at {:>6.2} (interpolation {:.3})",
            info.since_epoch.as_secs_f64(),
            self.ball.borrow().position,
            info.interpolation
        );
    }
}

/// Logs every scheduler event.
struct HealthListener;

impl SchedulerListener for HealthListener {
    fn on_event(&mut self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::FallingBehind => log::warn!("scheduler is falling behind"),
            other => log::info!("scheduler event: {other:?}"),
        }
    }
}

fn main() {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = SchedulerConfig::default();
    config.master_rate = Rate::from_preset(RatePreset::SixtyPerSecond);
    config.lag_warning_interval_secs = 5;

    let mut scheduler = Scheduler::with_config(config);

    let ball = Rc::new(RefCell::new(BouncingBall::new(scheduler.stop_handle(), 300)));
    scheduler.add_item(ball.clone(), Rate::from_preset(RatePreset::SixtyPerSecond));

    let probe = Rc::new(RefCell::new(TelemetryProbe {
        flags: RequestFlags::new(),
        ball: ball.clone(),
    }));
    scheduler.add_item(probe, Rate::from_count(2, Interval::PerSecond));

    scheduler.add_listener(Rc::new(RefCell::new(HealthListener)));

    scheduler.start();

    let data = scheduler.execution_data();
    log::info!(
        "run complete: {} frames ({} delayed, {} of those on wake)",
        data.frames_executed,
        data.frames_delayed_total,
        data.frames_delayed_thread_wake
    );
}
