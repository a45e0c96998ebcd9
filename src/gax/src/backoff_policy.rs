// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The trait for backoff policies.

use std::time::{Duration, Instant};

/// Computes the delay before the next attempt in a retry or polling loop.
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the delay to wait after a failed attempt.
    ///
    /// # Parameters
    /// * `loop_start` - when the loop started.
    /// * `attempt_count` - the number of attempts so far.
    fn on_failure(&self, loop_start: Instant, attempt_count: u32) -> Duration;
}
