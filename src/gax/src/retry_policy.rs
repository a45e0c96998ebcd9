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

//! Traits for retry policies and some common implementations.
//!
//! The clients automatically retry RPCs that fail with transient errors, as
//! long as the RPC is idempotent or the application says it is safe to retry.
//! The base policies classify errors; the decorators bound the loop by
//! attempt count or elapsed time.

use crate::error::Error;
use crate::retry_result::RetryResult;
use std::time::{Duration, Instant};

/// Controls the retry loop.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Queries the policy after an attempt failed.
    ///
    /// # Parameters
    /// * `loop_start` - when the retry loop started.
    /// * `attempt_count` - the number of attempts, including the failed one.
    /// * `idempotent` - if `true` the operation is safe to attempt more than
    ///   once. Many more errors are retryable on idempotent operations.
    /// * `error` - the error from the last attempt.
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult;

    /// The remaining time in the policy, for time-based policies.
    fn remaining_time(&self, _loop_start: Instant, _attempt_count: u32) -> Option<Duration> {
        None
    }
}

/// A retry policy that strictly follows [AIP-194](https://google.aip.dev/194).
///
/// The retry decision for service errors is based only on the canonical
/// status, and the only retryable status is `UNAVAILABLE`. Errors detected
/// before the RPC left the process are always retryable.
///
/// This policy must be decorated to limit the number of attempts or the
/// duration of the loop.
#[derive(Clone, Debug)]
pub struct Aip194Strict;

impl RetryPolicy for Aip194Strict {
    fn on_error(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        if error.is_before_rpc() {
            return RetryResult::Continue(error);
        }
        if !idempotent {
            return RetryResult::Permanent(error);
        }
        if error.is_io() || error.is_timeout() {
            return RetryResult::Continue(error);
        }
        if let Some(status) = error.status() {
            let unavailable =
                status.status.as_deref() == Some("UNAVAILABLE") || status.code == Some(503);
            return if unavailable {
                RetryResult::Continue(error)
            } else {
                RetryResult::Permanent(error)
            };
        }
        RetryResult::Permanent(error)
    }
}

/// A decorator that limits the number of attempts.
///
/// Once the inner policy allows a retry past the attempt limit this policy
/// returns [RetryResult::Exhausted]. Permanent classifications from the
/// inner policy are unchanged.
#[derive(Clone, Debug)]
pub struct LimitedAttemptCount<P> {
    inner: P,
    maximum_attempts: u32,
}

impl<P> LimitedAttemptCount<P> {
    pub fn new(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> RetryPolicy for LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        match self.inner.on_error(loop_start, attempt_count, idempotent, error) {
            RetryResult::Continue(e) if attempt_count >= self.maximum_attempts => {
                RetryResult::Exhausted(e)
            }
            flow => flow,
        }
    }

    fn remaining_time(&self, loop_start: Instant, attempt_count: u32) -> Option<Duration> {
        self.inner.remaining_time(loop_start, attempt_count)
    }
}

/// A decorator that limits the elapsed time of the retry loop.
#[derive(Clone, Debug)]
pub struct LimitedElapsedTime<P> {
    inner: P,
    maximum_duration: Duration,
}

impl<P> LimitedElapsedTime<P> {
    pub fn new(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }
}

impl<P> RetryPolicy for LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        match self.inner.on_error(loop_start, attempt_count, idempotent, error) {
            RetryResult::Continue(e) if loop_start.elapsed() >= self.maximum_duration => {
                RetryResult::Exhausted(e)
            }
            flow => flow,
        }
    }

    fn remaining_time(&self, loop_start: Instant, attempt_count: u32) -> Option<Duration> {
        let mine = self.maximum_duration.saturating_sub(loop_start.elapsed());
        match self.inner.remaining_time(loop_start, attempt_count) {
            Some(inner) => Some(std::cmp::min(inner, mine)),
            None => Some(mine),
        }
    }
}

/// Extension trait to decorate retry policies.
///
/// # Example
/// ```
/// use gcloud_gax::retry_policy::{Aip194Strict, RetryPolicyExt};
/// use std::time::Duration;
/// let policy = Aip194Strict
///     .with_time_limit(Duration::from_secs(10))
///     .with_attempt_limit(3);
/// ```
pub trait RetryPolicyExt: RetryPolicy + Sized {
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::new(self, maximum_attempts)
    }

    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::new(self, maximum_duration)
    }
}

impl<P: RetryPolicy + Sized> RetryPolicyExt for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    #[test]
    fn aip194_strict_service_errors() {
        let p = Aip194Strict;
        let now = Instant::now();
        assert!(p.on_error(now, 1, true, unavailable()).is_continue());
        assert!(p.on_error(now, 1, false, unavailable()).is_permanent());
        assert!(p.on_error(now, 1, true, not_found()).is_permanent());
    }

    #[test]
    fn aip194_strict_before_rpc() {
        let p = Aip194Strict;
        let now = Instant::now();
        // Authentication and serialization errors never left the process.
        assert!(p.on_error(now, 1, false, Error::authentication("x")).is_continue());
        assert!(p.on_error(now, 1, false, Error::ser("x")).is_continue());
    }

    #[test]
    fn aip194_strict_transport() {
        let p = Aip194Strict;
        let now = Instant::now();
        assert!(p.on_error(now, 1, true, Error::io("x")).is_continue());
        assert!(p.on_error(now, 1, true, Error::timeout("x")).is_continue());
        assert!(p.on_error(now, 1, false, Error::io("x")).is_permanent());
    }

    #[test]
    fn limited_attempt_count() {
        let p = Aip194Strict.with_attempt_limit(2);
        let now = Instant::now();
        assert!(p.on_error(now, 1, true, unavailable()).is_continue());
        assert!(p.on_error(now, 2, true, unavailable()).is_exhausted());
        // Permanent stays permanent even past the limit.
        assert!(p.on_error(now, 5, true, not_found()).is_permanent());
    }

    #[test]
    fn limited_elapsed_time() {
        let p = Aip194Strict.with_time_limit(Duration::from_secs(60));
        let start = Instant::now();
        assert!(p.on_error(start, 1, true, unavailable()).is_continue());
        let expired = Aip194Strict.with_time_limit(Duration::ZERO);
        assert!(expired.on_error(start, 1, true, unavailable()).is_exhausted());
        // Permanent classifications pass through unchanged.
        assert!(expired.on_error(start, 1, true, not_found()).is_permanent());
        let remaining = p.remaining_time(start, 1).unwrap();
        assert!(remaining <= Duration::from_secs(60));
    }

    fn unavailable() -> Error {
        Error::service(Status::new(503, "unavailable").set_status("UNAVAILABLE"))
    }

    fn not_found() -> Error {
        Error::service(Status::new(404, "not found").set_status("NOT_FOUND"))
    }
}
