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

//! Drives a server-side copy to completion.

use crate::rpc::{RewriteResult, StorageRpc};
use gax::error::Error;
use gax::options::RequestOptions;
use gax::retry::retry_loop;
use std::sync::Arc;

/// An in-progress server-side copy.
///
/// The service copies large blobs over several calls, each returning how
/// far it got and a token to resume from. [CopyWriter::result] performs the
/// remaining calls; [CopyWriter::copy_chunk] performs exactly one, for
/// callers that report progress.
pub struct CopyWriter {
    rpc: Arc<dyn StorageRpc>,
    options: RequestOptions,
    state: RewriteResult,
}

impl std::fmt::Debug for CopyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyWriter")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CopyWriter {
    pub(crate) fn new(
        rpc: Arc<dyn StorageRpc>,
        options: RequestOptions,
        state: RewriteResult,
    ) -> Self {
        Self {
            rpc,
            options,
            state,
        }
    }

    /// The size of the blob being copied.
    pub fn blob_size(&self) -> i64 {
        self.state.blob_size
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done
    }

    pub fn total_bytes_copied(&self) -> i64 {
        self.state.total_bytes_rewritten
    }

    /// Performs one more service call of an unfinished copy.
    ///
    /// Resuming from a token restarts the interrupted call instead of
    /// repeating completed work, so the call is safe to retry.
    pub async fn copy_chunk(&mut self) -> gax::Result<()> {
        if self.state.is_done {
            return Ok(());
        }
        let rpc = self.rpc.clone();
        let previous = self.state.clone();
        self.state = retry_loop(
            async move || rpc.continue_rewrite(previous.clone()).await,
            true,
            self.options.retry_policy.clone(),
            self.options.backoff_policy.clone(),
        )
        .await?;
        Ok(())
    }

    /// Runs the copy to completion and returns the target blob.
    pub async fn result(&mut self) -> gax::Result<crate::model::BlobInfo> {
        while !self.state.is_done {
            self.copy_chunk().await?;
        }
        self.state
            .result
            .clone()
            .ok_or_else(|| Error::other("the service reported the copy done without a result"))
    }
}
