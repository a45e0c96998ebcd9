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

//! The transport seam between the service client and the wire.
//!
//! [StorageRpc] receives fully resolved requests: the typed options on the
//! public surface have already been translated into an [RpcOptions] map, so
//! a transport only turns each entry into the matching query parameter or
//! conditional header. Tests mock this trait to observe exactly what the
//! client sends.

use crate::model::{BlobId, BlobInfo, BucketInfo};
use bytes::Bytes;
use gax::Result;
use std::collections::BTreeMap;

/// The wire-level request parameters a transport understands.
///
/// Keys are ordered so request maps compare deterministically in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RpcOption {
    /// `ifMetagenerationMatch` precondition on the target resource.
    IfMetagenerationMatch,
    /// `ifMetagenerationNotMatch` precondition on the target resource.
    IfMetagenerationNotMatch,
    /// `ifGenerationMatch` precondition on the target blob.
    IfGenerationMatch,
    /// `ifGenerationNotMatch` precondition on the target blob.
    IfGenerationNotMatch,
    /// `ifSourceMetagenerationMatch` precondition on a copy source.
    IfSourceMetagenerationMatch,
    /// `ifSourceMetagenerationNotMatch` precondition on a copy source.
    IfSourceMetagenerationNotMatch,
    /// `ifSourceGenerationMatch` precondition on a copy source.
    IfSourceGenerationMatch,
    /// `ifSourceGenerationNotMatch` precondition on a copy source.
    IfSourceGenerationNotMatch,
    /// `prefix` filter for list calls.
    Prefix,
    /// `maxResults` page size for list calls.
    MaxResults,
    /// `pageToken` cursor for list calls.
    PageToken,
    /// `fields` partial-response selector.
    Fields,
}

/// The resolved request parameters handed to the transport.
pub type RpcOptions = BTreeMap<RpcOption, serde_json::Value>;

/// One page of a list response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }
}

/// A resolved blob-rewrite request.
///
/// Carries everything [StorageRpc::open_rewrite] needs, and is retained by
/// [RewriteResult] so the continuation calls repeat the same parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RewriteRequest {
    pub source: BlobId,
    pub source_options: RpcOptions,
    pub target: BlobInfo,
    /// Whether `target` carries caller-supplied metadata that must replace
    /// the source metadata, rather than being copied from the source.
    pub override_info: bool,
    pub target_options: RpcOptions,
    /// Maximum bytes rewritten per call, when the caller limits it.
    pub max_bytes_rewritten_per_call: Option<i64>,
}

/// The state of a rewrite after one service call.
#[derive(Clone, Debug, PartialEq)]
pub struct RewriteResult {
    pub request: RewriteRequest,
    /// The target blob metadata, populated once the rewrite completes.
    pub result: Option<BlobInfo>,
    pub blob_size: i64,
    pub is_done: bool,
    pub rewrite_token: Option<String>,
    pub total_bytes_rewritten: i64,
}

/// A batch of storage requests submitted as a single RPC.
///
/// Entry order within each list is preserved by the transport; responses
/// come back in the same order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchRequest {
    pub to_delete: Vec<(BlobId, RpcOptions)>,
    pub to_update: Vec<(BlobInfo, RpcOptions)>,
    pub to_get: Vec<(BlobId, RpcOptions)>,
}

/// Per-operation outcomes of a [BatchRequest], in request order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub deletes: Vec<Result<bool>>,
    pub updates: Vec<Result<BlobInfo>>,
    pub gets: Vec<Result<Option<BlobInfo>>>,
}

/// The transport operations the storage client is built on.
///
/// `get_bucket`, `get_blob`, and the gets inside [StorageRpc::batch] resolve
/// to `Ok(None)` when the resource does not exist; `delete_*` resolves to
/// `Ok(false)`. Every other missing-resource case is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StorageRpc: Send + Sync {
    async fn create_bucket(&self, bucket: BucketInfo, options: RpcOptions) -> Result<BucketInfo>;

    async fn get_bucket(&self, name: String, options: RpcOptions) -> Result<Option<BucketInfo>>;

    async fn list_buckets(&self, options: RpcOptions) -> Result<ListResult<BucketInfo>>;

    async fn patch_bucket(&self, bucket: BucketInfo, options: RpcOptions) -> Result<BucketInfo>;

    async fn delete_bucket(&self, name: String, options: RpcOptions) -> Result<bool>;

    async fn create_blob(
        &self,
        blob: BlobInfo,
        content: Bytes,
        options: RpcOptions,
    ) -> Result<BlobInfo>;

    async fn get_blob(&self, id: BlobId, options: RpcOptions) -> Result<Option<BlobInfo>>;

    async fn list_blobs(&self, bucket: String, options: RpcOptions)
    -> Result<ListResult<BlobInfo>>;

    async fn patch_blob(&self, blob: BlobInfo, options: RpcOptions) -> Result<BlobInfo>;

    async fn delete_blob(&self, id: BlobId, options: RpcOptions) -> Result<bool>;

    /// Reads the full blob content.
    async fn load_blob(&self, id: BlobId, options: RpcOptions) -> Result<Bytes>;

    /// Concatenates `sources` (already in `target`'s bucket) into `target`.
    async fn compose(
        &self,
        sources: Vec<(String, RpcOptions)>,
        target: BlobInfo,
        target_options: RpcOptions,
    ) -> Result<BlobInfo>;

    /// Starts a rewrite and performs its first service call.
    async fn open_rewrite(&self, request: RewriteRequest) -> Result<RewriteResult>;

    /// Performs one more service call of an unfinished rewrite.
    async fn continue_rewrite(&self, previous: RewriteResult) -> Result<RewriteResult>;

    /// Submits a batch of requests as one RPC.
    async fn batch(&self, request: BatchRequest) -> Result<BatchResult>;
}
