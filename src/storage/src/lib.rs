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

//! Google Cloud Storage client library.
//!
//! The client exposes buckets and blobs as typed values, translates the
//! typed per-call options into wire parameters, and retries transient
//! failures according to the service's classification. The transport is an
//! injectable trait, so the full client surface is testable without a
//! network.
//!
//! # Example
//! ```no_run
//! # async fn sample(rpc: std::sync::Arc<dyn gcloud_storage::rpc::StorageRpc>) -> gcloud_storage::Result<()> {
//! use gcloud_storage::client::Storage;
//! use gcloud_storage::model::BlobInfo;
//!
//! let client = Storage::builder().with_rpc(rpc).build()?;
//! let blob = BlobInfo::builder("my-bucket", "my-object").build();
//! let created = client.create_blob(blob, "hello world", &[]).await?;
//! println!("uploaded generation {:?}", created.generation());
//! # Ok(()) }
//! ```

pub mod blob;
pub mod bucket;
pub mod client;
pub mod copy_writer;
pub mod model;
pub mod option;
pub mod retry_policy;
pub mod rpc;
pub mod signed_url;

/// The result type used by all operations in this crate.
pub type Result<T> = gax::Result<T>;

/// The error type used by all operations in this crate.
pub type Error = gax::error::Error;
