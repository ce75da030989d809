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

//! Scheduler lifecycle and health events, and the listener trait.
//!
//! Events are fanned out synchronously, on the scheduler's thread, to every
//! registered listener in insertion order.

use std::cell::RefCell;
use std::rc::Rc;

/// An event launched by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// An event of unknown type. Used in exceptional circumstances or to
    /// signal currently unsupported features.
    Unknown,

    /// The scheduler is unable to meet its target execution rate. Subject to
    /// a configurable cooldown that prevents it from being launched too
    /// frequently.
    FallingBehind,

    /// The scheduler has started updating its items. Emitted after the
    /// pending configuration is applied, before the first frame.
    Started,

    /// The scheduler has stopped updating its items. Emitted after the update
    /// loop exits but before `start()` returns.
    Stopped,
}

/// An observer of scheduler events.
pub trait SchedulerListener {
    /// Called for every event launched by a scheduler this listener is
    /// registered with.
    fn on_event(&mut self, event: SchedulerEvent);
}

/// Shared handle under which listeners are registered. The scheduler does not
/// own listeners; it compares handles by identity (`Rc::ptr_eq`) for removal
/// and lookup.
pub type ListenerHandle = Rc<RefCell<dyn SchedulerListener>>;

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [SchedulerEvent; 4] = [
        SchedulerEvent::Unknown,
        SchedulerEvent::FallingBehind,
        SchedulerEvent::Started,
        SchedulerEvent::Stopped,
    ];

    struct Recording {
        seen: Vec<SchedulerEvent>,
    }

    impl SchedulerListener for Recording {
        fn on_event(&mut self, event: SchedulerEvent) {
            self.seen.push(event);
        }
    }

    #[test]
    fn events_are_equal_only_to_their_own_kind() {
        for (i, a) in ALL_EVENTS.iter().enumerate() {
            for (j, b) in ALL_EVENTS.iter().enumerate() {
                assert_eq!(a == b, i == j, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn events_copy_and_clone_consistently() {
        for event in ALL_EVENTS {
            let copied = event;
            #[allow(clippy::clone_on_copy)]
            let cloned = event.clone();
            assert_eq!(copied, cloned);
        }
    }

    #[test]
    fn events_have_readable_debug_names() {
        assert_eq!(format!("{:?}", SchedulerEvent::Unknown), "Unknown");
        assert_eq!(
            format!("{:?}", SchedulerEvent::FallingBehind),
            "FallingBehind"
        );
        assert_eq!(format!("{:?}", SchedulerEvent::Started), "Started");
        assert_eq!(format!("{:?}", SchedulerEvent::Stopped), "Stopped");
    }

    #[test]
    fn a_listener_receives_unknown_like_any_other_kind() {
        let mut listener = Recording { seen: Vec::new() };
        for event in ALL_EVENTS {
            listener.on_event(event);
        }
        assert_eq!(listener.seen, ALL_EVENTS);
    }
}
