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

//! Per-client request options.

use crate::backoff_policy::BackoffPolicy;
use crate::retry_policy::RetryPolicy;
use std::sync::Arc;

/// The retry and backoff configuration carried by every service client.
///
/// Each service crate provides its own defaults (the retryable status codes
/// differ per service); applications override them through the client
/// builders.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub retry_policy: Arc<dyn RetryPolicy>,
    pub backoff_policy: Arc<dyn BackoffPolicy>,
}

impl RequestOptions {
    pub fn new(
        retry_policy: Arc<dyn RetryPolicy>,
        backoff_policy: Arc<dyn BackoffPolicy>,
    ) -> Self {
        Self {
            retry_policy,
            backoff_policy,
        }
    }
}
