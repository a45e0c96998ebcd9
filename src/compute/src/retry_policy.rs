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

//! The default retry policy for Compute Engine.

use gax::error::Error;
use gax::retry_policy::RetryPolicy;
use gax::retry_result::RetryResult;
use std::time::Instant;

/// The retryable status codes for Compute Engine.
///
/// Request timeout (408), too many requests (429), internal error (500),
/// and the gateway errors (502, 503, 504) are transient; everything else is
/// permanent. Transient errors are only retried when the attempt is
/// idempotent. Mutations are not idempotent: they enqueue a fresh operation
/// on every call, so a retry after an ambiguous failure could provision the
/// resource twice.
#[derive(Clone, Debug, Default)]
pub struct ComputeRetryPolicy;

fn is_transient(code: u16) -> bool {
    matches!(code, 408 | 429 | 500 | 502 | 503 | 504)
}

impl RetryPolicy for ComputeRetryPolicy {
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
