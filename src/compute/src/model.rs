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

//! Value objects mirroring the Compute Engine resource schema.
//!
//! Identifiers are project-relative and carry their scope (zone, region, or
//! global) so a transport can build the request path without extra
//! arguments. Server-assigned fields are attached with the chainable
//! `set_*` methods; client code only reads them.

use serde::{Deserialize, Serialize};

/// Identifies an address, which is either region-scoped or global.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressId {
    Region { region: String, address: String },
    Global { address: String },
}

impl AddressId {
    pub fn region<R: Into<String>, A: Into<String>>(region: R, address: A) -> Self {
        Self::Region {
            region: region.into(),
            address: address.into(),
        }
    }

    pub fn global<A: Into<String>>(address: A) -> Self {
        Self::Global {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Region { address, .. } | Self::Global { address } => address,
        }
    }

    /// The owning region, or `None` for a global address.
    pub fn scope_region(&self) -> Option<&str> {
        match self {
            Self::Region { region, .. } => Some(region),
            Self::Global { .. } => None,
        }
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region { region, address } => write!(f, "regions/{region}/addresses/{address}"),
            Self::Global { address } => write!(f, "global/addresses/{address}"),
        }
    }
}

/// Identifies a zone-scoped disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskId {
    zone: String,
    disk: String,
}

impl DiskId {
    pub fn of<Z: Into<String>, D: Into<String>>(zone: Z, disk: D) -> Self {
        Self {
            zone: zone.into(),
            disk: disk.into(),
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn disk(&self) -> &str {
        &self.disk
    }
}

impl std::fmt::Display for DiskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zones/{}/disks/{}", self.zone, self.disk)
    }
}

/// Identifies a global image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageId {
    image: String,
}

impl ImageId {
    pub fn of<I: Into<String>>(image: I) -> Self {
        Self {
            image: image.into(),
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "global/images/{}", self.image)
    }
}

/// Identifies a global snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotId {
    snapshot: String,
}

impl SnapshotId {
    pub fn of<S: Into<String>>(snapshot: S) -> Self {
        Self {
            snapshot: snapshot.into(),
        }
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "global/snapshots/{}", self.snapshot)
    }
}

/// The scope an operation runs in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationScope {
    Global,
    Region(String),
    Zone(String),
}

/// Identifies an operation within its scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationId {
    scope: OperationScope,
    operation: String,
}

impl OperationId {
    pub fn global<O: Into<String>>(operation: O) -> Self {
        Self {
            scope: OperationScope::Global,
            operation: operation.into(),
        }
    }

    pub fn region<R: Into<String>, O: Into<String>>(region: R, operation: O) -> Self {
        Self {
            scope: OperationScope::Region(region.into()),
            operation: operation.into(),
        }
    }

    pub fn zone<Z: Into<String>, O: Into<String>>(zone: Z, operation: O) -> Self {
        Self {
            scope: OperationScope::Zone(zone.into()),
            operation: operation.into(),
        }
    }

    pub fn scope(&self) -> &OperationScope {
        &self.scope
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            OperationScope::Global => write!(f, "global/operations/{}", self.operation),
            OperationScope::Region(r) => write!(f, "regions/{r}/operations/{}", self.operation),
            OperationScope::Zone(z) => write!(f, "zones/{z}/operations/{}", self.operation),
        }
    }
}

/// Information about an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    address_id: AddressId,
    /// The assigned IP, filled in by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_timestamp: Option<i64>,
}

impl AddressInfo {
    pub fn of(address_id: AddressId) -> Self {
        Self {
            address_id,
            address: None,
            status: None,
            generated_id: None,
            creation_timestamp: None,
        }
    }

    pub fn address_id(&self) -> &AddressId {
        &self.address_id
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }

    pub fn set_address<V: Into<String>>(mut self, v: V) -> Self {
        self.address = Some(v.into());
        self
    }

    pub fn set_status<V: Into<String>>(mut self, v: V) -> Self {
        self.status = Some(v.into());
        self
    }

    pub fn set_generated_id<V: Into<String>>(mut self, v: V) -> Self {
        self.generated_id = Some(v.into());
        self
    }

    pub fn set_creation_timestamp(mut self, v: i64) -> Self {
        self.creation_timestamp = Some(v);
        self
    }
}

/// How a disk gets its contents and capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiskConfiguration {
    /// An empty disk of the given type and size.
    Standard { disk_type: String, size_gb: i64 },
    /// A disk initialized from an image; the service picks type and size.
    Image { source_image: ImageId },
    /// A disk restored from a snapshot.
    Snapshot { source_snapshot: SnapshotId },
}

impl DiskConfiguration {
    pub fn standard<T: Into<String>>(disk_type: T, size_gb: i64) -> Self {
        Self::Standard {
            disk_type: disk_type.into(),
            size_gb,
        }
    }

    pub fn from_image(source_image: ImageId) -> Self {
        Self::Image { source_image }
    }

    pub fn from_snapshot(source_snapshot: SnapshotId) -> Self {
        Self::Snapshot { source_snapshot }
    }

    pub fn size_gb(&self) -> Option<i64> {
        match self {
            Self::Standard { size_gb, .. } => Some(*size_gb),
            _ => None,
        }
    }

    pub fn source_image(&self) -> Option<&ImageId> {
        match self {
            Self::Image { source_image } => Some(source_image),
            _ => None,
        }
    }

    pub fn source_snapshot(&self) -> Option<&SnapshotId> {
        match self {
            Self::Snapshot { source_snapshot } => Some(source_snapshot),
            _ => None,
        }
    }
}

/// Information about a disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    disk_id: DiskId,
    configuration: DiskConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_timestamp: Option<i64>,
}

impl DiskInfo {
    pub fn of(disk_id: DiskId, configuration: DiskConfiguration) -> Self {
        Self {
            disk_id,
            configuration,
            creation_status: None,
            generated_id: None,
            creation_timestamp: None,
        }
    }

    pub fn disk_id(&self) -> &DiskId {
        &self.disk_id
    }

    pub fn configuration(&self) -> &DiskConfiguration {
        &self.configuration
    }

    pub fn creation_status(&self) -> Option<&str> {
        self.creation_status.as_deref()
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }

    pub fn set_creation_status<V: Into<String>>(mut self, v: V) -> Self {
        self.creation_status = Some(v.into());
        self
    }

    pub fn set_generated_id<V: Into<String>>(mut self, v: V) -> Self {
        self.generated_id = Some(v.into());
        self
    }

    pub fn set_creation_timestamp(mut self, v: i64) -> Self {
        self.creation_timestamp = Some(v);
        self
    }
}

/// Information about a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    snapshot_id: SnapshotId,
    source_disk: DiskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disk_size_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_timestamp: Option<i64>,
}

impl SnapshotInfo {
    pub fn of(snapshot_id: SnapshotId, source_disk: DiskId) -> Self {
        Self {
            snapshot_id,
            source_disk,
            disk_size_gb: None,
            status: None,
            storage_bytes: None,
            generated_id: None,
            creation_timestamp: None,
        }
    }

    pub fn snapshot_id(&self) -> &SnapshotId {
        &self.snapshot_id
    }

    pub fn source_disk(&self) -> &DiskId {
        &self.source_disk
    }

    pub fn disk_size_gb(&self) -> Option<i64> {
        self.disk_size_gb
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn storage_bytes(&self) -> Option<i64> {
        self.storage_bytes
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }

    pub fn set_disk_size_gb(mut self, v: i64) -> Self {
        self.disk_size_gb = Some(v);
        self
    }

    pub fn set_status<V: Into<String>>(mut self, v: V) -> Self {
        self.status = Some(v.into());
        self
    }

    pub fn set_storage_bytes(mut self, v: i64) -> Self {
        self.storage_bytes = Some(v);
        self
    }

    pub fn set_generated_id<V: Into<String>>(mut self, v: V) -> Self {
        self.generated_id = Some(v.into());
        self
    }

    pub fn set_creation_timestamp(mut self, v: i64) -> Self {
        self.creation_timestamp = Some(v);
        self
    }
}

/// The deprecation state of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeprecationState {
    Deprecated,
    Obsolete,
    Deleted,
}

/// Marks an image as deprecated, with an optional replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationStatus {
    state: DeprecationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<ImageId>,
    /// Epoch millis at which the state took or takes effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deprecated: Option<i64>,
}

impl DeprecationStatus {
    pub fn of(state: DeprecationState) -> Self {
        Self {
            state,
            replacement: None,
            deprecated: None,
        }
    }

    pub fn state(&self) -> DeprecationState {
        self.state
    }

    pub fn replacement(&self) -> Option<&ImageId> {
        self.replacement.as_ref()
    }

    pub fn deprecated(&self) -> Option<i64> {
        self.deprecated
    }

    pub fn set_replacement(mut self, v: ImageId) -> Self {
        self.replacement = Some(v);
        self
    }

    pub fn set_deprecated(mut self, v: i64) -> Self {
        self.deprecated = Some(v);
        self
    }
}

/// Information about an image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    image_id: ImageId,
    source_disk: DiskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disk_size_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deprecation_status: Option<DeprecationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_timestamp: Option<i64>,
}

impl ImageInfo {
    pub fn of(image_id: ImageId, source_disk: DiskId) -> Self {
        Self {
            image_id,
            source_disk,
            disk_size_gb: None,
            status: None,
            deprecation_status: None,
            generated_id: None,
            creation_timestamp: None,
        }
    }

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    pub fn source_disk(&self) -> &DiskId {
        &self.source_disk
    }

    pub fn disk_size_gb(&self) -> Option<i64> {
        self.disk_size_gb
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn deprecation_status(&self) -> Option<&DeprecationStatus> {
        self.deprecation_status.as_ref()
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }

    pub fn set_disk_size_gb(mut self, v: i64) -> Self {
        self.disk_size_gb = Some(v);
        self
    }

    pub fn set_status<V: Into<String>>(mut self, v: V) -> Self {
        self.status = Some(v.into());
        self
    }

    pub fn set_deprecation_status(mut self, v: DeprecationStatus) -> Self {
        self.deprecation_status = Some(v);
        self
    }

    pub fn set_generated_id<V: Into<String>>(mut self, v: V) -> Self {
        self.generated_id = Some(v.into());
        self
    }

    pub fn set_creation_timestamp(mut self, v: i64) -> Self {
        self.creation_timestamp = Some(v);
        self
    }
}

/// The lifecycle state of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

/// One error reported by a completed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    pub code: String,
    pub message: String,
}

/// The state of a long-running operation, as last reported by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    id: OperationId,
    status: OperationStatus,
    /// Completion estimate from 0 to 100. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<OperationError>,
}

impl OperationInfo {
    pub fn of(id: OperationId, status: OperationStatus) -> Self {
        Self {
            id,
            status,
            progress: None,
            errors: Vec::new(),
        }
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    pub fn progress(&self) -> Option<i32> {
        self.progress
    }

    /// Errors reported by the service; only meaningful once done.
    pub fn errors(&self) -> &[OperationError] {
        &self.errors
    }

    pub fn set_progress(mut self, v: i32) -> Self {
        self.progress = Some(v);
        self
    }

    pub fn set_errors(mut self, v: Vec<OperationError>) -> Self {
        self.errors = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_id_scopes() {
        let regional = AddressId::region("us-central1", "a1");
        assert_eq!(regional.address(), "a1");
        assert_eq!(regional.scope_region(), Some("us-central1"));
        assert_eq!(regional.to_string(), "regions/us-central1/addresses/a1");

        let global = AddressId::global("a2");
        assert_eq!(global.address(), "a2");
        assert_eq!(global.scope_region(), None);
        assert_eq!(global.to_string(), "global/addresses/a2");
    }

    #[test]
    fn disk_configuration_accessors() {
        let standard = DiskConfiguration::standard("pd-ssd", 100);
        assert_eq!(standard.size_gb(), Some(100));
        assert_eq!(standard.source_image(), None);

        let from_image = DiskConfiguration::from_image(ImageId::of("debian-12"));
        assert_eq!(from_image.size_gb(), None);
        assert_eq!(from_image.source_image(), Some(&ImageId::of("debian-12")));

        let from_snapshot = DiskConfiguration::from_snapshot(SnapshotId::of("snap-1"));
        assert_eq!(
            from_snapshot.source_snapshot(),
            Some(&SnapshotId::of("snap-1"))
        );
    }

    #[test]
    fn operation_id_display() {
        assert_eq!(
            OperationId::global("op-1").to_string(),
            "global/operations/op-1"
        );
        assert_eq!(
            OperationId::region("us-central1", "op-2").to_string(),
            "regions/us-central1/operations/op-2"
        );
        assert_eq!(
            OperationId::zone("us-central1-a", "op-3").to_string(),
            "zones/us-central1-a/operations/op-3"
        );
    }

    #[test]
    fn operation_info_done_with_errors() {
        let info = OperationInfo::of(OperationId::global("op-1"), OperationStatus::Done)
            .set_errors(vec![OperationError {
                code: "RESOURCE_NOT_FOUND".to_string(),
                message: "disk missing".to_string(),
            }]);
        assert!(info.is_done());
        assert_eq!(info.errors().len(), 1);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let info = SnapshotInfo::of(SnapshotId::of("s1"), DiskId::of("us-central1-a", "d1"))
            .set_disk_size_gb(100);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["diskSizeGb"], 100);
        assert_eq!(json["sourceDisk"]["zone"], "us-central1-a");
    }
}
