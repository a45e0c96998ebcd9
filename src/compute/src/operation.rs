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

//! A long-running operation bound to the client that produced it.

use crate::client::Compute;
use crate::model::{OperationId, OperationInfo, OperationStatus};
use gax::error::Error;
use gax::polling_policy::PollingPolicy;
use gax::retry_result::RetryResult;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A queued mutation together with the client it came from, so callers can
/// poll it to completion.
#[derive(Clone, Debug)]
pub struct Operation {
    compute: Compute,
    info: OperationInfo,
}

impl Operation {
    pub fn new(compute: Compute, info: OperationInfo) -> Self {
        Self { compute, info }
    }

    pub fn info(&self) -> &OperationInfo {
        &self.info
    }

    pub fn id(&self) -> &OperationId {
        self.info.id()
    }

    pub fn status(&self) -> OperationStatus {
        self.info.status()
    }

    /// True if the operation record still exists.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self.compute.get_operation(self.info.id()).await?;
        Ok(found.is_some())
    }

    /// Re-fetches the operation state. `None` if the record is gone.
    pub async fn reload(&self) -> gax::Result<Option<Operation>> {
        let found = self.compute.get_operation(self.info.id()).await?;
        Ok(found.map(|info| Operation::new(self.compute.clone(), info)))
    }

    /// Discards the operation record. `Ok(false)` if it was already gone.
    pub async fn delete(&self) -> gax::Result<bool> {
        self.compute.delete_operation(self.info.id()).await
    }

    /// Polls until the operation completes, under `policy`.
    ///
    /// Waits the backoff delay between polls. A completed operation that
    /// reports errors becomes an `Err`; the service garbage collects
    /// operation records some time after completion, so a record that
    /// disappears mid-poll is treated as done with its last known state.
    pub async fn wait_until_done(
        self,
        policy: Arc<dyn PollingPolicy>,
    ) -> gax::Result<OperationInfo> {
        self.wait_with_sleep(policy, async |d| tokio::time::sleep(d).await)
            .await
    }

    /// The polling loop with an injectable sleep, so tests run without
    /// waiting.
    async fn wait_with_sleep<S>(
        mut self,
        policy: Arc<dyn PollingPolicy>,
        sleep: S,
    ) -> gax::Result<OperationInfo>
    where
        S: AsyncFn(Duration),
    {
        let loop_start = Instant::now();
        let mut attempt_count = 0_u32;
        loop {
            if self.info.is_done() {
                return completed(self.info);
            }
            attempt_count += 1;
            if let Some(error) = policy.on_in_progress(loop_start, attempt_count) {
                return Err(error);
            }
            let delay = self
                .compute
                .inner
                .options
                .backoff_policy
                .on_failure(loop_start, attempt_count);
            tracing::debug!(
                attempt_count,
                delay_ms = delay.as_millis() as u64,
                operation = %self.info.id(),
                "operation in progress, polling again"
            );
            sleep(delay).await;
            match self.compute.get_operation(self.info.id()).await {
                Ok(Some(info)) => self.info = info,
                Ok(None) => return Ok(self.info),
                Err(error) => match policy.on_error(loop_start, attempt_count, error) {
                    RetryResult::Continue(_) => {}
                    RetryResult::Permanent(e) | RetryResult::Exhausted(e) => return Err(e),
                },
            }
        }
    }
}

fn completed(info: OperationInfo) -> gax::Result<OperationInfo> {
    if info.errors().is_empty() {
        return Ok(info);
    }
    let details = info
        .errors()
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(Error::other(format!(
        "operation {} failed: {details}",
        info.id()
    )))
}
