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

//! A snapshot bound to the client that produced it.

use crate::client::Compute;
use crate::model::SnapshotInfo;
use crate::operation::Operation;
use crate::option::SnapshotOption;

/// A snapshot together with the client it came from, so callers can operate
/// on it without repeating the identifier.
#[derive(Clone, Debug)]
pub struct Snapshot {
    compute: Compute,
    info: SnapshotInfo,
}

impl Snapshot {
    pub fn new(compute: Compute, info: SnapshotInfo) -> Self {
        Self { compute, info }
    }

    pub fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    /// True if the snapshot still exists. Fetches only the identity.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .compute
            .get_snapshot(self.info.snapshot_id(), &[SnapshotOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the snapshot. `None` if it no longer exists.
    pub async fn reload(&self, options: &[SnapshotOption]) -> gax::Result<Option<Snapshot>> {
        let found = self
            .compute
            .get_snapshot(self.info.snapshot_id(), options)
            .await?;
        Ok(found.map(|info| Snapshot::new(self.compute.clone(), info)))
    }

    /// Deletes the snapshot. `None` if it did not exist.
    pub async fn delete(&self) -> gax::Result<Option<Operation>> {
        self.compute.delete_snapshot(self.info.snapshot_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiskId, OperationId, OperationInfo, OperationStatus, SnapshotId};
    use crate::rpc::MockComputeRpc;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn compute(mock: MockComputeRpc) -> Compute {
        Compute::builder().with_rpc(Arc::new(mock)).build().unwrap()
    }

    fn snapshot_info() -> SnapshotInfo {
        SnapshotInfo::of(SnapshotId::of("snap-1"), DiskId::of("us-central1-a", "d1"))
    }

    #[tokio::test]
    async fn delete_returns_the_queued_operation() {
        let mut mock = MockComputeRpc::new();
        mock.expect_delete_snapshot()
            .with(eq(SnapshotId::of("snap-1")))
            .times(1)
            .returning(|_| {
                Ok(Some(OperationInfo::of(
                    OperationId::global("op-1"),
                    OperationStatus::Pending,
                )))
            });
        let snapshot = Snapshot::new(compute(mock), snapshot_info());
        let operation = snapshot.delete().await.unwrap().unwrap();
        assert_eq!(operation.id(), &OperationId::global("op-1"));
    }

    #[tokio::test]
    async fn reload_missing_snapshot_is_none() {
        let mut mock = MockComputeRpc::new();
        mock.expect_get_snapshot()
            .times(1)
            .returning(|_, _| Ok(None));
        let snapshot = Snapshot::new(compute(mock), snapshot_info());
        assert!(snapshot.reload(&[]).await.unwrap().is_none());
    }
}
