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

//! The transport seam between the Compute Engine client and the wire.
//!
//! [ComputeRpc] receives fully resolved requests: typed options have been
//! translated into an [RpcOptions] map and identifiers carry their own
//! scope. Tests mock this trait to observe exactly what the client sends.

use crate::model::{
    AddressId, AddressInfo, DeprecationStatus, DiskId, DiskInfo, ImageId, ImageInfo, OperationId,
    OperationInfo, OperationScope, SnapshotId, SnapshotInfo,
};
use gax::Result;
use std::collections::BTreeMap;

/// The wire-level request parameters a transport understands.
///
/// Keys are ordered so request maps compare deterministically in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RpcOption {
    /// `filter` expression for list calls.
    Filter,
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

/// The transport operations the Compute Engine client is built on.
///
/// Mutations return the [OperationInfo] the service queued; callers poll it
/// through `get_operation`. `get_*` resolves to `Ok(None)` when the
/// resource does not exist, and `delete_*` to `Ok(None)` as well because
/// there is no operation to report for a resource that was never there.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ComputeRpc: Send + Sync {
    async fn create_address(&self, address: AddressInfo) -> Result<OperationInfo>;

    async fn get_address(
        &self,
        id: AddressId,
        options: RpcOptions,
    ) -> Result<Option<AddressInfo>>;

    async fn delete_address(&self, id: AddressId) -> Result<Option<OperationInfo>>;

    async fn list_region_addresses(
        &self,
        region: String,
        options: RpcOptions,
    ) -> Result<ListResult<AddressInfo>>;

    async fn list_global_addresses(&self, options: RpcOptions) -> Result<ListResult<AddressInfo>>;

    /// Lists addresses across every region plus the global scope.
    async fn list_addresses(&self, options: RpcOptions) -> Result<ListResult<AddressInfo>>;

    async fn create_disk(&self, disk: DiskInfo) -> Result<OperationInfo>;

    async fn get_disk(&self, id: DiskId, options: RpcOptions) -> Result<Option<DiskInfo>>;

    async fn delete_disk(&self, id: DiskId) -> Result<Option<OperationInfo>>;

    async fn resize_disk(&self, id: DiskId, size_gb: i64) -> Result<OperationInfo>;

    async fn list_disks(&self, zone: String, options: RpcOptions) -> Result<ListResult<DiskInfo>>;

    /// Lists disks across every zone.
    async fn list_all_disks(&self, options: RpcOptions) -> Result<ListResult<DiskInfo>>;

    async fn create_snapshot(&self, snapshot: SnapshotInfo) -> Result<OperationInfo>;

    async fn get_snapshot(
        &self,
        id: SnapshotId,
        options: RpcOptions,
    ) -> Result<Option<SnapshotInfo>>;

    async fn delete_snapshot(&self, id: SnapshotId) -> Result<Option<OperationInfo>>;

    async fn list_snapshots(&self, options: RpcOptions) -> Result<ListResult<SnapshotInfo>>;

    async fn create_image(&self, image: ImageInfo) -> Result<OperationInfo>;

    async fn get_image(&self, id: ImageId, options: RpcOptions) -> Result<Option<ImageInfo>>;

    async fn delete_image(&self, id: ImageId) -> Result<Option<OperationInfo>>;

    async fn deprecate_image(
        &self,
        id: ImageId,
        status: DeprecationStatus,
    ) -> Result<OperationInfo>;

    async fn list_images(&self, options: RpcOptions) -> Result<ListResult<ImageInfo>>;

    async fn get_operation(&self, id: OperationId) -> Result<Option<OperationInfo>>;

    /// Discards the operation record. `Ok(false)` if it was already gone.
    async fn delete_operation(&self, id: OperationId) -> Result<bool>;

    async fn list_operations(
        &self,
        scope: OperationScope,
        options: RpcOptions,
    ) -> Result<ListResult<OperationInfo>>;
}
