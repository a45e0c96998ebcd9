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

//! The generic retry loop used by all service clients.

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::error::Error;
use crate::retry_policy::RetryPolicy;
use crate::retry_result::RetryResult;
use std::sync::Arc;
use std::time::Duration;

/// Runs `inner` until it succeeds, the retry policy stops the loop, or an
/// error is classified as permanent.
///
/// In between attempts the loop waits the amount of time prescribed by the
/// backoff policy, using [tokio::time::sleep].
pub async fn retry_loop<F, Response>(
    inner: F,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: AsyncFnMut() -> Result<Response> + Send,
{
    retry_loop_with_sleep(
        inner,
        async |d| tokio::time::sleep(d).await,
        idempotent,
        retry_policy,
        backoff_policy,
    )
    .await
}

/// The retry loop with an injectable sleep, so tests run without waiting.
pub async fn retry_loop_with_sleep<F, S, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: AsyncFnMut() -> Result<Response> + Send,
    S: AsyncFn(Duration) + Send,
{
    let loop_start = std::time::Instant::now();
    let mut attempt_count = 0_u32;
    loop {
        attempt_count += 1;
        let error = match inner().await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        let error = match retry_policy.on_error(loop_start, attempt_count, idempotent, error) {
            RetryResult::Permanent(e) | RetryResult::Exhausted(e) => return Err(e),
            RetryResult::Continue(e) => e,
        };
        let delay = backoff_policy.on_failure(loop_start, attempt_count);
        // If the policy cannot outlast the backoff there is no point in
        // sleeping just to fail.
        let remaining = retry_policy.remaining_time(loop_start, attempt_count);
        if remaining.is_some_and(|remaining| remaining < delay) {
            return Err(Error::exhausted(error));
        }
        tracing::debug!(
            attempt_count,
            delay_ms = delay.as_millis() as u64,
            %error,
            "attempt failed, backing off"
        );
        sleep(delay).await;
    }
}
