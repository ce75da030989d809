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

//! Execution statistics for a scheduler run.

/// Monotonic counters describing the current (or most recent) run of a
/// scheduler. All counters are zeroed when the scheduler starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionData {
    /// Number of frames executed.
    pub frames_executed: u64,

    /// Total number of frames that were delayed, for any reason.
    pub frames_delayed_total: u64,

    /// Number of frames that were delayed because the thread woke up too late
    /// from its intra-frame sleep.
    pub frames_delayed_thread_wake: u64,

    /// Number of item update calls skipped at the request of the items
    /// themselves. Counts items, not frames: several skips within one frame
    /// each increment this.
    pub skipped_update_calls: u64,

    /// Number of item stop requests refused because the active configuration
    /// forbids item-initiated stops.
    pub refused_stop_requests: u64,
}

impl ExecutionData {
    pub(crate) fn reset(&mut self) {
        *self = ExecutionData::default();
    }
}
