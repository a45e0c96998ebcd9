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

//! A blob bound to the client that produced it.

use crate::client::{CopyRequest, Storage};
use crate::copy_writer::CopyWriter;
use crate::model::{BlobId, BlobInfo};
use crate::option::{BlobGetOption, BlobSourceOption, BlobTargetOption};
use crate::signed_url::SignUrlOption;
use bytes::Bytes;
use std::time::Duration;

/// A blob together with the client it came from, so callers can operate on
/// it without repeating its identity.
#[derive(Clone, Debug)]
pub struct Blob {
    storage: Storage,
    info: BlobInfo,
}

impl Blob {
    pub fn new(storage: Storage, info: BlobInfo) -> Self {
        Self { storage, info }
    }

    pub fn info(&self) -> &BlobInfo {
        &self.info
    }

    pub fn id(&self) -> BlobId {
        self.info.blob_id()
    }

    /// True if the blob still exists. Fetches only the identity.
    pub async fn exists(&self) -> gax::Result<bool> {
        let found = self
            .storage
            .get_blob(self.id(), &[BlobGetOption::fields([])])
            .await?;
        Ok(found.is_some())
    }

    /// Re-fetches the blob metadata. `None` if it no longer exists.
    pub async fn reload(&self, options: &[BlobGetOption]) -> gax::Result<Option<Blob>> {
        let found = self.storage.get_blob(self.id(), options).await?;
        Ok(found.map(|info| Blob::new(self.storage.clone(), info)))
    }

    /// Writes this blob's metadata back to the service.
    pub async fn update(&self, options: &[BlobTargetOption]) -> gax::Result<Blob> {
        let info = self.storage.update_blob(self.info.clone(), options).await?;
        Ok(Blob::new(self.storage.clone(), info))
    }

    pub async fn delete(&self, options: &[BlobSourceOption]) -> gax::Result<bool> {
        self.storage.delete_blob(self.id(), options).await
    }

    /// Reads the blob's full content.
    pub async fn content(&self, options: &[BlobSourceOption]) -> gax::Result<Bytes> {
        self.storage.read_all_bytes(self.id(), options).await
    }

    /// Starts copying this blob to `target`.
    pub async fn copy_to(&self, target: BlobId) -> gax::Result<CopyWriter> {
        self.storage.copy(CopyRequest::new(self.id(), target)).await
    }

    /// Mints a V2 signed URL for this blob.
    pub fn sign_url(
        &self,
        expires_in: Duration,
        options: &[SignUrlOption],
    ) -> gax::Result<url::Url> {
        self.storage.sign_url(&self.info, expires_in, options)
    }
}
