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

//! Traits to control polling loops for long-running operations.
//!
//! Unlike retry loops, polling loops distinguish two events: a poll that
//! fails (the status RPC itself errored) and a poll that reports the
//! operation is still in progress. Polls are always safe to repeat, so there
//! is no idempotency parameter.

use crate::error::Error;
use crate::retry_result::RetryResult;
use std::time::{Duration, Instant};

/// Controls a polling loop for a long-running operation.
pub trait PollingPolicy: Send + Sync + std::fmt::Debug {
    /// Queries the policy after a poll failed.
    fn on_error(&self, loop_start: Instant, attempt_count: u32, error: Error) -> RetryResult;

    /// Queries the policy when the operation is still in progress.
    ///
    /// Returns the error that stops the loop, or `None` to keep polling.
    fn on_in_progress(&self, _loop_start: Instant, _attempt_count: u32) -> Option<Error> {
        None
    }
}

/// A polling policy that continues on any poll failure.
///
/// Transient failures while polling do not invalidate the operation; the
/// operation keeps running on the server regardless. This policy must be
/// decorated to bound the loop.
#[derive(Clone, Debug)]
pub struct AlwaysContinue;

impl PollingPolicy for AlwaysContinue {
    fn on_error(&self, _loop_start: Instant, _attempt_count: u32, error: Error) -> RetryResult {
        RetryResult::Continue(error)
    }
}

/// A decorator that bounds the total duration of the polling loop.
#[derive(Clone, Debug)]
pub struct LimitedPollingTime<P> {
    inner: P,
    maximum_duration: Duration,
}

impl<P> LimitedPollingTime<P> {
    pub fn new(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn expired(&self, loop_start: Instant) -> bool {
        loop_start.elapsed() >= self.maximum_duration
    }
}

impl<P> PollingPolicy for LimitedPollingTime<P>
where
    P: PollingPolicy,
{
    fn on_error(&self, loop_start: Instant, attempt_count: u32, error: Error) -> RetryResult {
        match self.inner.on_error(loop_start, attempt_count, error) {
            RetryResult::Continue(e) if self.expired(loop_start) => RetryResult::Exhausted(e),
            flow => flow,
        }
    }

    fn on_in_progress(&self, loop_start: Instant, attempt_count: u32) -> Option<Error> {
        if self.expired(loop_start) {
            return Some(Error::exhausted(format!(
                "operation still in progress after {:?}",
                self.maximum_duration
            )));
        }
        self.inner.on_in_progress(loop_start, attempt_count)
    }
}

/// A decorator that bounds the number of polls.
#[derive(Clone, Debug)]
pub struct LimitedPollingAttempts<P> {
    inner: P,
    maximum_attempts: u32,
}

impl<P> LimitedPollingAttempts<P> {
    pub fn new(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> PollingPolicy for LimitedPollingAttempts<P>
where
    P: PollingPolicy,
{
    fn on_error(&self, loop_start: Instant, attempt_count: u32, error: Error) -> RetryResult {
        match self.inner.on_error(loop_start, attempt_count, error) {
            RetryResult::Continue(e) if attempt_count >= self.maximum_attempts => {
                RetryResult::Exhausted(e)
            }
            flow => flow,
        }
    }

    fn on_in_progress(&self, loop_start: Instant, attempt_count: u32) -> Option<Error> {
        if attempt_count >= self.maximum_attempts {
            return Some(Error::exhausted(format!(
                "operation still in progress after {} polls",
                self.maximum_attempts
            )));
        }
        self.inner.on_in_progress(loop_start, attempt_count)
    }
}

/// Extension trait to decorate polling policies.
pub trait PollingPolicyExt: PollingPolicy + Sized {
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedPollingTime<Self> {
        LimitedPollingTime::new(self, maximum_duration)
    }

    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedPollingAttempts<Self> {
        LimitedPollingAttempts::new(self, maximum_attempts)
    }
}

impl<P: PollingPolicy + Sized> PollingPolicyExt for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    fn poll_error() -> Error {
        Error::service(Status::new(503, "unavailable"))
    }

    #[test]
    fn always_continue() {
        let p = AlwaysContinue;
        let now = Instant::now();
        assert!(p.on_error(now, 100, poll_error()).is_continue());
        assert!(p.on_in_progress(now, 100).is_none());
    }

    #[test]
    fn limited_attempts() {
        let p = AlwaysContinue.with_attempt_limit(3);
        let now = Instant::now();
        assert!(p.on_error(now, 1, poll_error()).is_continue());
        assert!(p.on_error(now, 3, poll_error()).is_exhausted());
        assert!(p.on_in_progress(now, 1).is_none());
        let err = p.on_in_progress(now, 3).unwrap();
        assert!(err.is_exhausted(), "{err:?}");
    }

    #[test]
    fn limited_time() {
        let live = AlwaysContinue.with_time_limit(Duration::from_secs(300));
        let now = Instant::now();
        assert!(live.on_error(now, 1, poll_error()).is_continue());
        assert!(live.on_in_progress(now, 1).is_none());

        let expired = AlwaysContinue.with_time_limit(Duration::ZERO);
        assert!(expired.on_error(now, 1, poll_error()).is_exhausted());
        assert!(expired.on_in_progress(now, 1).is_some());
    }
}
