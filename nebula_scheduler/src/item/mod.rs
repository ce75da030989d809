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

//! Scheduled items: the updatables a scheduler drives.
//!
//! Implement [`ScheduledItem`], embed a [`RequestFlags`] and register the
//! item with a scheduler together with a [`Rate`](crate::core::rate::Rate).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::time_info::TimeInfo;

/// The request flags every scheduled item exposes to its scheduler.
///
/// Both flags use interior mutability so an item can raise them from inside
/// its own `on_update` without any additional plumbing.
#[derive(Debug, Default)]
pub struct RequestFlags {
    stop: Cell<bool>,
    skip: Cell<bool>,
}

impl RequestFlags {
    /// Creates flags with neither request raised.
    pub fn new() -> Self {
        RequestFlags::default()
    }

    /// Asks the scheduler to stop executing. Subject to the active config's
    /// stop-refusal policy; a refused request stays raised until the item
    /// clears it.
    pub fn request_stop(&self) {
        self.stop.set(true);
    }

    /// Asks the scheduler to skip this item's next update call.
    pub fn request_skip(&self) {
        self.skip.set(true);
    }

    /// True if a stop request is raised.
    pub fn stop_requested(&self) -> bool {
        self.stop.get()
    }

    /// True if a skip request is raised.
    pub fn skip_requested(&self) -> bool {
        self.skip.get()
    }

    /// Clears both flags.
    ///
    /// The scheduler calls this when it honors a request. Note that honoring
    /// a skip clears the stop flag too, so a refused stop raised together
    /// with a skip is silently downgraded to the skip.
    pub fn reset(&self) {
        self.stop.set(false);
        self.skip.set(false);
    }
}

/// An updatable that can register for periodic updates with a scheduler.
///
/// Only [`on_update`](ScheduledItem::on_update) is required; the start and
/// stop hooks default to no-ops.
pub trait ScheduledItem {
    /// The item's request flags. Implementors typically embed a
    /// [`RequestFlags`] and return a reference to it.
    fn flags(&self) -> &RequestFlags;

    /// Called by the scheduler as close to the requested update rate as
    /// possible, with timing information for convenience.
    fn on_update(&mut self, info: &TimeInfo);

    /// Called by the scheduler when it starts executing, before any updates.
    fn on_scheduler_start(&mut self, _info: &TimeInfo) {}

    /// Called by the scheduler once it has stopped executing, after the last
    /// update of the run.
    fn on_scheduler_stop(&mut self, _info: &TimeInfo) {}
}

/// Shared handle under which items are registered. The scheduler does not own
/// items; it compares handles by identity (`Rc::ptr_eq`) for removal and
/// lookup.
pub type ItemHandle = Rc<RefCell<dyn ScheduledItem>>;
