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

//! The Compute Engine client.
//!
//! Every mutation is asynchronous on the service side: the RPC queues an
//! operation and returns it immediately. The client wraps those into
//! [Operation] handles so callers can poll for completion. Reads and
//! deletes are retried on transient failures; mutations are not, because a
//! duplicate attempt would queue a second operation.

use crate::model::{
    AddressId, AddressInfo, DeprecationStatus, DiskId, DiskInfo, ImageId, ImageInfo, OperationId,
    OperationInfo, OperationScope, SnapshotId, SnapshotInfo,
};
use crate::operation::Operation;
use crate::option::{
    AddressListOption, AddressOption, DiskListOption, DiskOption, ImageListOption, ImageOption,
    OperationListOption, SnapshotListOption, SnapshotOption, get_options, list_options,
};
use crate::retry_policy::ComputeRetryPolicy;
use crate::rpc::{ComputeRpc, ListResult};
use gax::backoff_policy::BackoffPolicy;
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoff;
use gax::options::RequestOptions;
use gax::retry::retry_loop;
use gax::retry_policy::{RetryPolicy, RetryPolicyExt as _};
use std::sync::Arc;

/// The default attempt limit, matching the service's recommended client
/// configuration.
const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// One page of a listing, with the token to fetch the next one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl<T> From<ListResult<T>> for Page<T> {
    fn from(r: ListResult<T>) -> Self {
        Self {
            items: r.items,
            next_page_token: r.next_page_token,
        }
    }
}

/// The Compute Engine service client.
///
/// The client is a cheap handle; clones share the transport and
/// configuration.
#[derive(Clone)]
pub struct Compute {
    pub(crate) inner: Arc<ComputeInner>,
}

pub(crate) struct ComputeInner {
    pub(crate) rpc: Arc<dyn ComputeRpc>,
    pub(crate) options: RequestOptions,
}

impl std::fmt::Debug for Compute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compute")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Configures and creates [Compute] clients.
pub struct ComputeBuilder {
    rpc: Option<Arc<dyn ComputeRpc>>,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
}

impl ComputeBuilder {
    fn new() -> Self {
        Self {
            rpc: None,
            retry_policy: Arc::new(ComputeRetryPolicy.with_attempt_limit(DEFAULT_MAX_ATTEMPTS)),
            backoff_policy: Arc::new(ExponentialBackoff::default()),
        }
    }

    /// Sets the transport. Required.
    pub fn with_rpc(mut self, rpc: Arc<dyn ComputeRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_backoff_policy(mut self, policy: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff_policy = policy;
        self
    }

    pub fn build(self) -> gax::Result<Compute> {
        let rpc = self
            .rpc
            .ok_or_else(|| Error::other("a transport is required to build a client"))?;
        Ok(Compute {
            inner: Arc::new(ComputeInner {
                rpc,
                options: RequestOptions::new(self.retry_policy, self.backoff_policy),
            }),
        })
    }
}

impl Compute {
    pub fn builder() -> ComputeBuilder {
        ComputeBuilder::new()
    }

    async fn with_retry<F, T>(&self, idempotent: bool, inner: F) -> gax::Result<T>
    where
        F: AsyncFnMut() -> gax::Result<T> + Send,
    {
        retry_loop(
            inner,
            idempotent,
            self.inner.options.retry_policy.clone(),
            self.inner.options.backoff_policy.clone(),
        )
        .await
    }

    fn operation(&self, info: OperationInfo) -> Operation {
        Operation::new(self.clone(), info)
    }

    /// Requests a new address. The returned operation completes once the
    /// address is reserved.
    pub async fn create_address(&self, address: AddressInfo) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || {
            rpc.create_address(address.clone()).await
        })
        .await
        .map(|info| self.operation(info))
    }

    /// Returns `Ok(None)` if the address does not exist.
    pub async fn get_address(
        &self,
        id: &AddressId,
        options: &[AddressOption],
    ) -> gax::Result<Option<AddressInfo>> {
        let options = get_options(options);
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || {
            rpc.get_address(id.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the address did not exist.
    pub async fn delete_address(&self, id: &AddressId) -> gax::Result<Option<Operation>> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.delete_address(id.clone()).await)
            .await
            .map(|info| info.map(|info| self.operation(info)))
    }

    /// Returns one page of a region's addresses.
    pub async fn list_region_addresses(
        &self,
        region: &str,
        options: &[AddressListOption],
    ) -> gax::Result<Page<AddressInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        let region = region.to_string();
        self.with_retry(true, async move || {
            rpc.list_region_addresses(region.clone(), options.clone())
                .await
        })
        .await
        .map(Page::from)
    }

    /// Returns one page of the project's global addresses.
    pub async fn list_global_addresses(
        &self,
        options: &[AddressListOption],
    ) -> gax::Result<Page<AddressInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || {
            rpc.list_global_addresses(options.clone()).await
        })
        .await
        .map(Page::from)
    }

    /// Returns one page of addresses across every region and the global
    /// scope.
    pub async fn list_addresses(
        &self,
        options: &[AddressListOption],
    ) -> gax::Result<Page<AddressInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || rpc.list_addresses(options.clone()).await)
            .await
            .map(Page::from)
    }

    pub async fn create_disk(&self, disk: DiskInfo) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || rpc.create_disk(disk.clone()).await)
            .await
            .map(|info| self.operation(info))
    }

    /// Returns `Ok(None)` if the disk does not exist.
    pub async fn get_disk(
        &self,
        id: &DiskId,
        options: &[DiskOption],
    ) -> gax::Result<Option<DiskInfo>> {
        let options = get_options(options);
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || {
            rpc.get_disk(id.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the disk did not exist.
    pub async fn delete_disk(&self, id: &DiskId) -> gax::Result<Option<Operation>> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.delete_disk(id.clone()).await)
            .await
            .map(|info| info.map(|info| self.operation(info)))
    }

    /// Grows a disk to `size_gb`. Disks never shrink.
    pub async fn resize_disk(&self, id: &DiskId, size_gb: i64) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(false, async move || {
            rpc.resize_disk(id.clone(), size_gb).await
        })
        .await
        .map(|info| self.operation(info))
    }

    /// Returns one page of a zone's disks.
    pub async fn list_disks(
        &self,
        zone: &str,
        options: &[DiskListOption],
    ) -> gax::Result<Page<DiskInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        let zone = zone.to_string();
        self.with_retry(true, async move || {
            rpc.list_disks(zone.clone(), options.clone()).await
        })
        .await
        .map(Page::from)
    }

    /// Returns one page of disks across every zone.
    pub async fn list_all_disks(&self, options: &[DiskListOption]) -> gax::Result<Page<DiskInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || rpc.list_all_disks(options.clone()).await)
            .await
            .map(Page::from)
    }

    pub async fn create_snapshot(&self, snapshot: SnapshotInfo) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || {
            rpc.create_snapshot(snapshot.clone()).await
        })
        .await
        .map(|info| self.operation(info))
    }

    /// Returns `Ok(None)` if the snapshot does not exist.
    pub async fn get_snapshot(
        &self,
        id: &SnapshotId,
        options: &[SnapshotOption],
    ) -> gax::Result<Option<SnapshotInfo>> {
        let options = get_options(options);
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || {
            rpc.get_snapshot(id.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the snapshot did not exist.
    pub async fn delete_snapshot(&self, id: &SnapshotId) -> gax::Result<Option<Operation>> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.delete_snapshot(id.clone()).await)
            .await
            .map(|info| info.map(|info| self.operation(info)))
    }

    /// Returns one page of the project's snapshots.
    pub async fn list_snapshots(
        &self,
        options: &[SnapshotListOption],
    ) -> gax::Result<Page<SnapshotInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || rpc.list_snapshots(options.clone()).await)
            .await
            .map(Page::from)
    }

    pub async fn create_image(&self, image: ImageInfo) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || rpc.create_image(image.clone()).await)
            .await
            .map(|info| self.operation(info))
    }

    /// Returns `Ok(None)` if the image does not exist.
    pub async fn get_image(
        &self,
        id: &ImageId,
        options: &[ImageOption],
    ) -> gax::Result<Option<ImageInfo>> {
        let options = get_options(options);
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || {
            rpc.get_image(id.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the image did not exist.
    pub async fn delete_image(&self, id: &ImageId) -> gax::Result<Option<Operation>> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.delete_image(id.clone()).await)
            .await
            .map(|info| info.map(|info| self.operation(info)))
    }

    /// Marks an image as deprecated, obsolete, or deleted.
    pub async fn deprecate_image(
        &self,
        id: &ImageId,
        status: DeprecationStatus,
    ) -> gax::Result<Operation> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(false, async move || {
            rpc.deprecate_image(id.clone(), status.clone()).await
        })
        .await
        .map(|info| self.operation(info))
    }

    /// Returns one page of the project's images.
    pub async fn list_images(&self, options: &[ImageListOption]) -> gax::Result<Page<ImageInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || rpc.list_images(options.clone()).await)
            .await
            .map(Page::from)
    }

    /// Returns `Ok(None)` if the operation record no longer exists.
    pub async fn get_operation(&self, id: &OperationId) -> gax::Result<Option<OperationInfo>> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.get_operation(id.clone()).await)
            .await
    }

    /// Discards the operation record. `Ok(false)` if it was already gone.
    pub async fn delete_operation(&self, id: &OperationId) -> gax::Result<bool> {
        let rpc = self.inner.rpc.clone();
        let id = id.clone();
        self.with_retry(true, async move || rpc.delete_operation(id.clone()).await)
            .await
    }

    /// Returns one page of the operations in `scope`.
    pub async fn list_operations(
        &self,
        scope: OperationScope,
        options: &[OperationListOption],
    ) -> gax::Result<Page<OperationInfo>> {
        let options = list_options(options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || {
            rpc.list_operations(scope.clone(), options.clone()).await
        })
        .await
        .map(Page::from)
    }
}
