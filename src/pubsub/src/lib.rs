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

//! Google Cloud Pub/Sub client library.
//!
//! The client manages topics and subscriptions, publishes messages, and
//! pulls and acknowledges deliveries. The transport is an injectable trait,
//! so the full client surface is testable without a network.
//!
//! # Example
//! ```no_run
//! # async fn sample(rpc: std::sync::Arc<dyn gcloud_pubsub::rpc::PubSubRpc>) -> gcloud_pubsub::Result<()> {
//! use gcloud_pubsub::client::PubSub;
//! use gcloud_pubsub::model::Message;
//!
//! let client = PubSub::builder().with_rpc(rpc).build()?;
//! let ids = client
//!     .publish("projects/p/topics/t", vec![Message::of("hello")])
//!     .await?;
//! println!("published {ids:?}");
//! # Ok(()) }
//! ```

pub mod client;
pub mod model;
pub mod retry_policy;
pub mod rpc;

/// The result type used by all operations in this crate.
pub type Result<T> = gax::Result<T>;

/// The error type used by all operations in this crate.
pub type Error = gax::error::Error;
