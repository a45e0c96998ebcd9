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

//! An address bound to the client that produced it.

use crate::client::Compute;
use crate::model::AddressInfo;
use crate::operation::Operation;
use crate::option::AddressOption;

/// An address together with the client it came from, so callers can operate
/// on it without repeating the identifier.
#[derive(Clone, Debug)]
pub struct Address {
    compute: Compute,
    info: AddressInfo,
}

impl Address {
    pub fn new(compute: Compute, info: AddressInfo) -> Self {
        Self { compute, info }
    }

    pub fn info(&self) -> &AddressInfo {
        &self.info
    }

    /// True if the address still exists. Fetches only the identity.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .compute
            .get_address(self.info.address_id(), &[AddressOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the address. `None` if it no longer exists.
    pub async fn reload(&self, options: &[AddressOption]) -> gax::Result<Option<Address>> {
        let found = self
            .compute
            .get_address(self.info.address_id(), options)
            .await?;
        Ok(found.map(|info| Address::new(self.compute.clone(), info)))
    }

    /// Releases the address. `None` if it did not exist.
    pub async fn delete(&self) -> gax::Result<Option<Operation>> {
        self.compute.delete_address(self.info.address_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AddressId, OperationId, OperationInfo, OperationStatus};
    use crate::rpc::{MockComputeRpc, RpcOption, RpcOptions};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn compute(mock: MockComputeRpc) -> Compute {
        Compute::builder().with_rpc(Arc::new(mock)).build().unwrap()
    }

    #[tokio::test]
    async fn exists_fetches_only_the_identity() {
        let id = AddressId::region("us-central1", "a1");
        let expected = RpcOptions::from([(RpcOption::Fields, "selfLink".into())]);
        let mut mock = MockComputeRpc::new();
        mock.expect_get_address()
            .with(eq(id.clone()), eq(expected))
            .times(1)
            .returning(|id, _| Ok(Some(AddressInfo::of(id))));
        let address = Address::new(compute(mock), AddressInfo::of(id));
        assert!(address.exists().await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_the_queued_operation() {
        let id = AddressId::global("a1");
        let mut mock = MockComputeRpc::new();
        mock.expect_delete_address()
            .with(eq(id.clone()))
            .times(1)
            .returning(|_| {
                Ok(Some(OperationInfo::of(
                    OperationId::global("op-1"),
                    OperationStatus::Pending,
                )))
            });
        let address = Address::new(compute(mock), AddressInfo::of(id));
        let operation = address.delete().await.unwrap().unwrap();
        assert_eq!(operation.id(), &OperationId::global("op-1"));
    }

    #[tokio::test]
    async fn reload_missing_address_is_none() {
        let mut mock = MockComputeRpc::new();
        mock.expect_get_address()
            .times(1)
            .returning(|_, _| Ok(None));
        let address = Address::new(compute(mock), AddressInfo::of(AddressId::global("a1")));
        assert!(address.reload(&[]).await.unwrap().is_none());
    }
}
