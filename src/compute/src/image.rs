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

//! An image bound to the client that produced it.

use crate::client::Compute;
use crate::model::{DeprecationStatus, ImageInfo};
use crate::operation::Operation;
use crate::option::ImageOption;

/// An image together with the client it came from, so callers can operate
/// on it without repeating the identifier.
#[derive(Clone, Debug)]
pub struct Image {
    compute: Compute,
    info: ImageInfo,
}

impl Image {
    pub fn new(compute: Compute, info: ImageInfo) -> Self {
        Self { compute, info }
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    /// True if the image still exists. Fetches only the identity.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .compute
            .get_image(self.info.image_id(), &[ImageOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the image. `None` if it no longer exists.
    pub async fn reload(&self, options: &[ImageOption]) -> gax::Result<Option<Image>> {
        let found = self.compute.get_image(self.info.image_id(), options).await?;
        Ok(found.map(|info| Image::new(self.compute.clone(), info)))
    }

    /// Deletes the image. `None` if it did not exist.
    pub async fn delete(&self) -> gax::Result<Option<Operation>> {
        self.compute.delete_image(self.info.image_id()).await
    }

    /// Marks the image as deprecated, obsolete, or deleted.
    pub async fn deprecate(&self, status: DeprecationStatus) -> gax::Result<Operation> {
        self.compute
            .deprecate_image(self.info.image_id(), status)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DeprecationState, DiskId, ImageId, OperationId, OperationInfo, OperationStatus,
    };
    use crate::rpc::{MockComputeRpc, RpcOption, RpcOptions};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn compute(mock: MockComputeRpc) -> Compute {
        Compute::builder().with_rpc(Arc::new(mock)).build().unwrap()
    }

    fn image_info() -> ImageInfo {
        ImageInfo::of(ImageId::of("img-1"), DiskId::of("us-central1-a", "d1"))
    }

    #[tokio::test]
    async fn exists_fetches_only_the_identity() {
        let expected = RpcOptions::from([(RpcOption::Fields, "selfLink".into())]);
        let mut mock = MockComputeRpc::new();
        mock.expect_get_image()
            .with(eq(ImageId::of("img-1")), eq(expected))
            .times(1)
            .returning(|_, _| Ok(Some(image_info())));
        let image = Image::new(compute(mock), image_info());
        assert!(image.exists().await.unwrap());
    }

    #[tokio::test]
    async fn deprecate_targets_this_image() {
        let status = DeprecationStatus::of(DeprecationState::Obsolete);
        let mut mock = MockComputeRpc::new();
        mock.expect_deprecate_image()
            .with(eq(ImageId::of("img-1")), eq(status.clone()))
            .times(1)
            .returning(|_, _| {
                Ok(OperationInfo::of(
                    OperationId::global("op-1"),
                    OperationStatus::Pending,
                ))
            });
        let image = Image::new(compute(mock), image_info());
        let operation = image.deprecate(status).await.unwrap();
        assert_eq!(operation.id(), &OperationId::global("op-1"));
    }
}
