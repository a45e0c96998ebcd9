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

//! The default retry policy for Pub/Sub.

use gax::error::Error;
use gax::retry_policy::RetryPolicy;
use gax::retry_result::RetryResult;
use std::time::Instant;

/// The retryable status codes for Pub/Sub.
///
/// Only `DEADLINE_EXCEEDED` and `UNAVAILABLE` are transient, and only for
/// idempotent methods. Non-idempotent methods, publishing among them, are
/// never retried on a service error because the first attempt may have
/// been applied.
#[derive(Clone, Debug, Default)]
pub struct PubSubRetryPolicy;

impl RetryPolicy for PubSubRetryPolicy {
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
        if error.is_timeout() {
            return RetryResult::Continue(error);
        }
        let retryable = error
            .status()
            .and_then(|s| s.status.as_deref())
            .is_some_and(|s| matches!(s, "DEADLINE_EXCEEDED" | "UNAVAILABLE"));
        if retryable {
            RetryResult::Continue(error)
        } else {
            RetryResult::Permanent(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::Status;
    use test_case::test_case;

    fn status_error(status: &str) -> Error {
        Error::service(Status::new(503, "rpc failed").set_status(status))
    }

    #[test_case("UNAVAILABLE")]
    #[test_case("DEADLINE_EXCEEDED")]
    fn transient_statuses_continue_when_idempotent(status: &str) {
        let p = PubSubRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, true, status_error(status))
                .is_continue()
        );
    }

    #[test_case("NOT_FOUND")]
    #[test_case("ALREADY_EXISTS")]
    #[test_case("PERMISSION_DENIED")]
    #[test_case("RESOURCE_EXHAUSTED")]
    fn other_statuses_are_permanent(status: &str) {
        let p = PubSubRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, true, status_error(status))
                .is_permanent()
        );
    }

    #[test]
    fn non_idempotent_never_retries_service_errors() {
        let p = PubSubRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, false, status_error("UNAVAILABLE"))
                .is_permanent()
        );
    }

    #[test]
    fn timeouts_continue_when_idempotent() {
        let p = PubSubRetryPolicy;
        let err = Error::timeout("deadline exceeded");
        assert!(p.on_error(Instant::now(), 1, true, err).is_continue());
    }
}
