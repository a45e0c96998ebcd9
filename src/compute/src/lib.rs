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

//! Google Compute Engine client library.
//!
//! The client manages addresses, disks, snapshots, and images. Every
//! mutation queues a long-running operation on the service; the returned
//! [operation::Operation] handle polls it to completion under a polling
//! policy. The transport is an injectable trait, so the full client surface
//! is testable without a network.
//!
//! # Example
//! ```no_run
//! # async fn sample(rpc: std::sync::Arc<dyn gcloud_compute::rpc::ComputeRpc>) -> gcloud_compute::Result<()> {
//! use gcloud_compute::client::Compute;
//! use gcloud_compute::model::{DiskConfiguration, DiskId, DiskInfo};
//! use gax::polling_policy::{AlwaysContinue, PollingPolicyExt as _};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let client = Compute::builder().with_rpc(rpc).build()?;
//! let disk = DiskInfo::of(
//!     DiskId::of("us-central1-a", "my-disk"),
//!     DiskConfiguration::standard("pd-ssd", 100),
//! );
//! let operation = client.create_disk(disk).await?;
//! let policy = Arc::new(AlwaysContinue.with_time_limit(Duration::from_secs(300)));
//! operation.wait_until_done(policy).await?;
//! # Ok(()) }
//! ```

pub mod address;
pub mod client;
pub mod disk;
pub mod image;
pub mod model;
pub mod operation;
pub mod option;
pub mod retry_policy;
pub mod rpc;
pub mod snapshot;

/// The result type used by all operations in this crate.
pub type Result<T> = gax::Result<T>;

/// The error type used by all operations in this crate.
pub type Error = gax::error::Error;
