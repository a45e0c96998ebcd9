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

//! The default retry policy for Cloud Storage.

use gax::error::Error;
use gax::retry_policy::RetryPolicy;
use gax::retry_result::RetryResult;
use std::time::Instant;

/// The retryable status codes for Cloud Storage.
///
/// Request timeout (408), too many requests (429), internal error (500),
/// and the gateway errors (502, 503, 504) are transient. Everything else,
/// notably 501 and the 4xx precondition failures this client leans on, is
/// permanent. Transient errors are only retried when the attempt is
/// idempotent.
#[derive(Clone, Debug, Default)]
pub struct StorageRetryPolicy;

fn is_transient(code: u16) -> bool {
    matches!(code, 408 | 429 | 500 | 502 | 503 | 504)
}

impl RetryPolicy for StorageRetryPolicy {
    fn on_error(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        if error.is_before_rpc() {
            // Nothing reached the service, safe to retry regardless of
            // idempotency.
            return RetryResult::Continue(error);
        }
        if !idempotent {
            return RetryResult::Permanent(error);
        }
        if error.is_io() || error.is_timeout() {
            return RetryResult::Continue(error);
        }
        match error.http_status_code() {
            Some(code) if is_transient(code) => RetryResult::Continue(error),
            _ => RetryResult::Permanent(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::Status;
    use test_case::test_case;

    fn http_error(code: u16) -> Error {
        Error::service(Status::new(code, format!("http error {code}")))
    }

    #[test_case(408)]
    #[test_case(429)]
    #[test_case(500)]
    #[test_case(502)]
    #[test_case(503)]
    #[test_case(504)]
    fn transient_codes_continue_when_idempotent(code: u16) {
        let p = StorageRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, true, http_error(code))
                .is_continue()
        );
    }

    #[test_case(400)]
    #[test_case(404)]
    #[test_case(412)]
    #[test_case(501)]
    fn other_codes_are_permanent(code: u16) {
        let p = StorageRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, true, http_error(code))
                .is_permanent()
        );
    }

    #[test]
    fn transient_code_permanent_when_not_idempotent() {
        let p = StorageRetryPolicy;
        assert!(
            p.on_error(Instant::now(), 1, false, http_error(503))
                .is_permanent()
        );
    }

    #[test]
    fn io_errors_continue() {
        let p = StorageRetryPolicy;
        let err = Error::io("connection reset");
        assert!(p.on_error(Instant::now(), 1, true, err).is_continue());
    }

    #[test]
    fn serialization_errors_continue_even_when_not_idempotent() {
        let p = StorageRetryPolicy;
        let err = Error::ser("cannot encode request");
        assert!(p.on_error(Instant::now(), 1, false, err).is_continue());
    }
}
