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

//! A bucket bound to the client that produced it.

use crate::blob::Blob;
use crate::client::{Page, Storage};
use crate::model::{BlobInfo, BucketInfo};
use crate::option::{
    BlobListOption, BlobTargetOption, BucketGetOption, BucketSourceOption, BucketTargetOption,
};
use bytes::Bytes;

/// A bucket together with the client it came from, so callers can operate
/// on it without repeating the bucket name.
#[derive(Clone, Debug)]
pub struct Bucket {
    storage: Storage,
    info: BucketInfo,
}

impl Bucket {
    pub fn new(storage: Storage, info: BucketInfo) -> Self {
        Self { storage, info }
    }

    pub fn info(&self) -> &BucketInfo {
        &self.info
    }

    /// True if the bucket still exists. Fetches only the name.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .storage
            .get_bucket(self.info.name(), &[BucketGetOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the bucket metadata. `None` if it no longer exists.
    pub async fn reload(&self, options: &[BucketGetOption]) -> gax::Result<Option<Bucket>> {
        let found = self.storage.get_bucket(self.info.name(), options).await?;
        Ok(found.map(|info| Bucket::new(self.storage.clone(), info)))
    }

    /// Writes this bucket's metadata back to the service.
    pub async fn update(&self, options: &[BucketTargetOption]) -> gax::Result<Bucket> {
        let info = self.storage.update_bucket(self.info.clone(), options).await?;
        Ok(Bucket::new(self.storage.clone(), info))
    }

    pub async fn delete(&self, options: &[BucketSourceOption]) -> gax::Result<bool> {
        self.storage.delete_bucket(self.info.name(), options).await
    }

    /// Uploads `content` into this bucket under `name`.
    pub async fn create_blob<N: Into<String>, C: Into<Bytes>>(
        &self,
        name: N,
        content: C,
        options: &[BlobTargetOption],
    ) -> gax::Result<Blob> {
        let info = BlobInfo::builder(self.info.name(), name).build();
        let created = self.storage.create_blob(info, content, options).await?;
        Ok(Blob::new(self.storage.clone(), created))
    }

    /// Returns one page of this bucket's blobs.
    pub async fn list_blobs(&self, options: &[BlobListOption]) -> gax::Result<Page<BlobInfo>> {
        self.storage.list_blobs(self.info.name(), options).await
    }
}
