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

//! Internal registries for scheduled items and listeners.
//!
//! Both are insertion-ordered sequences with linear add, first-match remove
//! and find. The expected population is small; nothing here needs to be
//! faster than O(n).

use std::rc::Rc;
use std::time::Duration;

use crate::event::{ListenerHandle, SchedulerEvent};
use crate::item::ItemHandle;

/// Scheduling bookkeeping the scheduler tracks per registered item.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemState {
    /// Nanoseconds between updates, or `None` for an unlimited rate.
    pub timestep: Option<Duration>,
    /// The time at which the next update frame for this item should commence.
    pub next_frame: Duration,
    /// The time at which the last update was delivered.
    pub last_update: Duration,
}

/// A registered item together with its scheduling state.
pub(crate) struct ScheduleEntry {
    pub item: ItemHandle,
    pub state: ItemState,
}

/// Insertion-ordered list of scheduled items.
///
/// Duplicates are permitted: this is a list, not a set. Removal takes out the
/// first handle identical to the argument.
#[derive(Default)]
pub(crate) struct ItemRegistry {
    entries: Vec<ScheduleEntry>,
}

impl ItemRegistry {
    pub fn add(&mut self, item: ItemHandle, timestep: Option<Duration>, last_update: Duration) {
        self.entries.push(ScheduleEntry {
            item,
            state: ItemState {
                timestep,
                next_frame: Duration::ZERO,
                last_update,
            },
        });
        log::debug!("scheduled item added ({} registered)", self.entries.len());
    }

    pub fn remove(&mut self, item: &ItemHandle) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| Rc::ptr_eq(&entry.item, item))
        {
            Some(index) => {
                self.entries.remove(index);
                log::debug!("scheduled item removed ({} registered)", self.entries.len());
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &ItemHandle) -> bool {
        self.entries
            .iter()
            .any(|entry| Rc::ptr_eq(&entry.item, item))
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ScheduleEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Insertion-ordered list of scheduler listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: Vec<ListenerHandle>,
}

impl ListenerRegistry {
    pub fn add(&mut self, listener: ListenerHandle) {
        self.listeners.push(listener);
        log::debug!("scheduler listener added ({} registered)", self.listeners.len());
    }

    pub fn remove(&mut self, listener: &ListenerHandle) -> bool {
        match self
            .listeners
            .iter()
            .position(|registered| Rc::ptr_eq(registered, listener))
        {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, listener: &ListenerHandle) -> bool {
        self.listeners
            .iter()
            .any(|registered| Rc::ptr_eq(registered, listener))
    }

    /// Delivers `event` to every listener, in insertion order.
    pub fn broadcast(&self, event: SchedulerEvent) {
        for listener in &self.listeners {
            listener.borrow_mut().on_event(event);
        }
    }
}
