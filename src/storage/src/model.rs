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

//! Value objects mirroring the Cloud Storage resource schema.
//!
//! These types are constructed either from a server response or from a
//! user-supplied builder, and are immutable afterwards. Use `to_builder()`
//! to derive a modified copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a bucket.
///
/// # Example
/// ```
/// use gcloud_storage::model::BucketInfo;
/// let info = BucketInfo::builder("my-bucket")
///     .set_location("US")
///     .build();
/// assert_eq!(info.name(), "my-bucket");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metageneration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_found_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    versioning_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create_time: Option<i64>,
}

impl BucketInfo {
    /// Creates an info holding only the bucket name.
    pub fn of<N: Into<String>>(name: N) -> Self {
        Self::builder(name).build()
    }

    /// Returns a builder seeded with the bucket name.
    pub fn builder<N: Into<String>>(name: N) -> BucketInfoBuilder {
        BucketInfoBuilder {
            info: Self {
                name: name.into(),
                ..Self::default()
            },
        }
    }

    /// Returns a builder seeded with a copy of this info.
    pub fn to_builder(&self) -> BucketInfoBuilder {
        BucketInfoBuilder { info: self.clone() }
    }

    /// The bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The service-assigned id, if the info came from the service.
    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    /// The metadata generation.
    pub fn metageneration(&self) -> Option<i64> {
        self.metageneration
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn storage_class(&self) -> Option<&str> {
        self.storage_class.as_deref()
    }

    pub fn index_page(&self) -> Option<&str> {
        self.index_page.as_deref()
    }

    pub fn not_found_page(&self) -> Option<&str> {
        self.not_found_page.as_deref()
    }

    pub fn versioning_enabled(&self) -> Option<bool> {
        self.versioning_enabled
    }

    pub fn create_time(&self) -> Option<i64> {
        self.create_time
    }
}

/// Builds [BucketInfo] instances.
#[derive(Clone, Debug)]
pub struct BucketInfoBuilder {
    info: BucketInfo,
}

impl BucketInfoBuilder {
    pub fn set_generated_id<V: Into<String>>(mut self, v: V) -> Self {
        self.info.generated_id = Some(v.into());
        self
    }

    pub fn set_metageneration(mut self, v: i64) -> Self {
        self.info.metageneration = Some(v);
        self
    }

    pub fn set_location<V: Into<String>>(mut self, v: V) -> Self {
        self.info.location = Some(v.into());
        self
    }

    pub fn set_storage_class<V: Into<String>>(mut self, v: V) -> Self {
        self.info.storage_class = Some(v.into());
        self
    }

    pub fn set_index_page<V: Into<String>>(mut self, v: V) -> Self {
        self.info.index_page = Some(v.into());
        self
    }

    pub fn set_not_found_page<V: Into<String>>(mut self, v: V) -> Self {
        self.info.not_found_page = Some(v.into());
        self
    }

    pub fn set_versioning_enabled(mut self, v: bool) -> Self {
        self.info.versioning_enabled = Some(v);
        self
    }

    pub fn set_create_time(mut self, v: i64) -> Self {
        self.info.create_time = Some(v);
        self
    }

    pub fn build(self) -> BucketInfo {
        self.info
    }
}

/// A blob identifier: bucket name, blob name, and an optional generation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlobId {
    bucket: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation: Option<i64>,
}

impl BlobId {
    pub fn of<B: Into<String>, N: Into<String>>(bucket: B, name: N) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            generation: None,
        }
    }

    pub fn with_generation<B: Into<String>, N: Into<String>>(
        bucket: B,
        name: N,
        generation: i64,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            generation: Some(generation),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> Option<i64> {
        self.generation
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.generation {
            Some(g) => write!(f, "{}/{}#{}", self.bucket, self.name, g),
            None => write!(f, "{}/{}", self.bucket, self.name),
        }
    }
}

/// Information about a blob.
///
/// # Example
/// ```
/// use gcloud_storage::model::BlobInfo;
/// let info = BlobInfo::builder("my-bucket", "my-object")
///     .set_content_type("text/plain")
///     .build();
/// assert_eq!(info.blob_id().name(), "my-object");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlobInfo {
    bucket: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metageneration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<i64>,
    #[serde(rename = "md5Hash", skip_serializing_if = "Option::is_none")]
    md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crc32c: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete_time: Option<i64>,
}

impl BlobInfo {
    /// Creates an info holding only the blob identity.
    pub fn of(id: BlobId) -> Self {
        Self::from_id(id).build()
    }

    /// Returns a builder seeded with the bucket and blob names.
    pub fn builder<B: Into<String>, N: Into<String>>(bucket: B, name: N) -> BlobInfoBuilder {
        Self::from_id(BlobId::of(bucket, name))
    }

    /// Returns a builder seeded with a blob id.
    pub fn from_id(id: BlobId) -> BlobInfoBuilder {
        BlobInfoBuilder {
            info: Self {
                bucket: id.bucket().to_string(),
                name: id.name().to_string(),
                generation: id.generation(),
                ..Self::default()
            },
        }
    }

    /// Returns a builder seeded with a copy of this info.
    pub fn to_builder(&self) -> BlobInfoBuilder {
        BlobInfoBuilder { info: self.clone() }
    }

    /// The identity of this blob.
    pub fn blob_id(&self) -> BlobId {
        BlobId {
            bucket: self.bucket.clone(),
            name: self.name.clone(),
            generation: self.generation,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> Option<i64> {
        self.generation
    }

    pub fn metageneration(&self) -> Option<i64> {
        self.metageneration
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control.as_deref()
    }

    pub fn size(&self) -> Option<i64> {
        self.size
    }

    /// The base64-encoded MD5 hash.
    pub fn md5(&self) -> Option<&str> {
        self.md5.as_deref()
    }

    /// The base64-encoded, big-endian CRC32C checksum.
    pub fn crc32c(&self) -> Option<&str> {
        self.crc32c.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn delete_time(&self) -> Option<i64> {
        self.delete_time
    }
}

/// Builds [BlobInfo] instances.
#[derive(Clone, Debug)]
pub struct BlobInfoBuilder {
    info: BlobInfo,
}

impl BlobInfoBuilder {
    pub fn set_generation(mut self, v: i64) -> Self {
        self.info.generation = Some(v);
        self
    }

    pub fn set_metageneration(mut self, v: i64) -> Self {
        self.info.metageneration = Some(v);
        self
    }

    pub fn set_content_type<V: Into<String>>(mut self, v: V) -> Self {
        self.info.content_type = Some(v.into());
        self
    }

    pub fn set_content_encoding<V: Into<String>>(mut self, v: V) -> Self {
        self.info.content_encoding = Some(v.into());
        self
    }

    pub fn set_cache_control<V: Into<String>>(mut self, v: V) -> Self {
        self.info.cache_control = Some(v.into());
        self
    }

    pub fn set_size(mut self, v: i64) -> Self {
        self.info.size = Some(v);
        self
    }

    /// Sets or clears the base64-encoded MD5 hash.
    pub fn set_md5<V: Into<Option<String>>>(mut self, v: V) -> Self {
        self.info.md5 = v.into();
        self
    }

    /// Sets or clears the base64-encoded CRC32C checksum.
    pub fn set_crc32c<V: Into<Option<String>>>(mut self, v: V) -> Self {
        self.info.crc32c = v.into();
        self
    }

    pub fn set_metadata(mut self, v: BTreeMap<String, String>) -> Self {
        self.info.metadata = v;
        self
    }

    pub fn set_delete_time(mut self, v: i64) -> Self {
        self.info.delete_time = Some(v);
        self
    }

    pub fn build(self) -> BlobInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_info_builder_roundtrip() {
        let info = BucketInfo::builder("b1")
            .set_metageneration(42)
            .set_location("US")
            .build();
        assert_eq!(info.name(), "b1");
        assert_eq!(info.metageneration(), Some(42));
        assert_eq!(info.location(), Some("US"));

        let copy = info.to_builder().set_index_page("index.html").build();
        assert_eq!(copy.index_page(), Some("index.html"));
        // The original is unchanged.
        assert_eq!(info.index_page(), None);
    }

    #[test]
    fn bucket_info_serde() {
        let info = BucketInfo::builder("b1").set_metageneration(42).build();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"name": "b1", "metageneration": 42}));
        let parsed: BucketInfo = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, info);
    }

    #[test]
    fn blob_id() {
        let id = BlobId::of("b1", "n1");
        assert_eq!(id.bucket(), "b1");
        assert_eq!(id.name(), "n1");
        assert_eq!(id.generation(), None);
        let id = BlobId::with_generation("b1", "n1", 7);
        assert_eq!(id.generation(), Some(7));
        assert_eq!(format!("{id}"), "b1/n1#7");
    }

    #[test]
    fn blob_info_builder_roundtrip() {
        let info = BlobInfo::builder("b1", "n1")
            .set_generation(24)
            .set_metageneration(42)
            .set_content_type("application/json")
            .set_md5("md5string".to_string())
            .build();
        assert_eq!(info.blob_id(), BlobId::with_generation("b1", "n1", 24));
        assert_eq!(info.content_type(), Some("application/json"));

        let cleared = info.to_builder().set_md5(None).build();
        assert_eq!(cleared.md5(), None);
        assert_eq!(info.md5(), Some("md5string"));
    }

    #[test]
    fn blob_info_serde_wire_names() {
        let info = BlobInfo::builder("b1", "n1")
            .set_md5("abc".to_string())
            .set_crc32c("def".to_string())
            .set_content_type("text/plain")
            .build();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bucket": "b1",
                "name": "n1",
                "contentType": "text/plain",
                "md5Hash": "abc",
                "crc32c": "def",
            })
        );
    }
}
