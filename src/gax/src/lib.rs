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

//! Shared plumbing for the gcloud client libraries.
//!
//! This crate contains the pieces that are common to every service client:
//! the error model, the retry and backoff policies, the generic retry loop,
//! the polling policies for long-running operations, and the pagination
//! adapter. Applications rarely use this crate directly; they configure the
//! per-service clients, which delegate here.

pub mod backoff_policy;
pub mod clock;
pub mod error;
pub mod exponential_backoff;
pub mod options;
pub mod paginator;
pub mod polling_policy;
pub mod retry;
pub mod retry_policy;
pub mod retry_result;

/// The result type used by all client operations.
pub type Result<T> = std::result::Result<T, error::Error>;
