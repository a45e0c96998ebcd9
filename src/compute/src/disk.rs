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

//! A disk bound to the client that produced it.

use crate::client::Compute;
use crate::model::{DiskInfo, SnapshotId, SnapshotInfo};
use crate::operation::Operation;
use crate::option::DiskOption;

/// A disk together with the client it came from, so callers can operate on
/// it without repeating the identifier.
#[derive(Clone, Debug)]
pub struct Disk {
    compute: Compute,
    info: DiskInfo,
}

impl Disk {
    pub fn new(compute: Compute, info: DiskInfo) -> Self {
        Self { compute, info }
    }

    pub fn info(&self) -> &DiskInfo {
        &self.info
    }

    /// True if the disk still exists. Fetches only the identity.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .compute
            .get_disk(self.info.disk_id(), &[DiskOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the disk. `None` if it no longer exists.
    pub async fn reload(&self, options: &[DiskOption]) -> gax::Result<Option<Disk>> {
        let found = self.compute.get_disk(self.info.disk_id(), options).await?;
        Ok(found.map(|info| Disk::new(self.compute.clone(), info)))
    }

    /// Deletes the disk. `None` if it did not exist.
    pub async fn delete(&self) -> gax::Result<Option<Operation>> {
        self.compute.delete_disk(self.info.disk_id()).await
    }

    /// Grows the disk to `size_gb`. Disks never shrink.
    pub async fn resize(&self, size_gb: i64) -> gax::Result<Operation> {
        self.compute.resize_disk(self.info.disk_id(), size_gb).await
    }

    /// Snapshots this disk under `snapshot_name`.
    pub async fn create_snapshot<N: Into<String>>(
        &self,
        snapshot_name: N,
    ) -> gax::Result<Operation> {
        let info = SnapshotInfo::of(
            SnapshotId::of(snapshot_name),
            self.info.disk_id().clone(),
        );
        self.compute.create_snapshot(info).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiskConfiguration, DiskId, OperationId, OperationInfo, OperationStatus};
    use crate::rpc::MockComputeRpc;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn compute(mock: MockComputeRpc) -> Compute {
        Compute::builder().with_rpc(Arc::new(mock)).build().unwrap()
    }

    fn disk_info() -> DiskInfo {
        DiskInfo::of(
            DiskId::of("us-central1-a", "d1"),
            DiskConfiguration::standard("pd-ssd", 100),
        )
    }

    fn queued() -> OperationInfo {
        OperationInfo::of(
            OperationId::zone("us-central1-a", "op-1"),
            OperationStatus::Pending,
        )
    }

    #[tokio::test]
    async fn resize_targets_this_disk() {
        let mut mock = MockComputeRpc::new();
        mock.expect_resize_disk()
            .with(eq(DiskId::of("us-central1-a", "d1")), eq(200))
            .times(1)
            .returning(|_, _| Ok(queued()));
        let disk = Disk::new(compute(mock), disk_info());
        let operation = disk.resize(200).await.unwrap();
        assert_eq!(operation.id(), &OperationId::zone("us-central1-a", "op-1"));
    }

    #[tokio::test]
    async fn create_snapshot_references_the_source_disk() {
        let mut mock = MockComputeRpc::new();
        mock.expect_create_snapshot()
            .withf(|snapshot| {
                snapshot.snapshot_id() == &SnapshotId::of("snap-1")
                    && snapshot.source_disk() == &DiskId::of("us-central1-a", "d1")
            })
            .times(1)
            .returning(|_| Ok(queued()));
        let disk = Disk::new(compute(mock), disk_info());
        disk.create_snapshot("snap-1").await.unwrap();
    }

    #[tokio::test]
    async fn reload_missing_disk_is_none() {
        let mut mock = MockComputeRpc::new();
        mock.expect_get_disk().times(1).returning(|_, _| Ok(None));
        let disk = Disk::new(compute(mock), disk_info());
        assert!(disk.reload(&[]).await.unwrap().is_none());
    }
}
