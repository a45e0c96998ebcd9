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

//! Typed per-call options and their translation to wire parameters.
//!
//! Every resource shares the same option shapes, parameterized by a field
//! enum that supplies the partial-response selector names. The identity of
//! a resource travels in its `selfLink`, so that selector is always
//! requested even when the caller asks for no fields at all.

use crate::rpc::{RpcOption, RpcOptions};

/// A resource attribute selectable in a partial response.
pub trait FieldSelector: Copy {
    fn selector(&self) -> &'static str;
}

/// An address attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressField {
    Address,
    CreationTimestamp,
    Id,
    Name,
    Region,
    Status,
    Users,
}

impl FieldSelector for AddressField {
    fn selector(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::CreationTimestamp => "creationTimestamp",
            Self::Id => "id",
            Self::Name => "name",
            Self::Region => "region",
            Self::Status => "status",
            Self::Users => "users",
        }
    }
}

/// A disk attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiskField {
    CreationTimestamp,
    Id,
    Name,
    SizeGb,
    SourceImage,
    SourceSnapshot,
    Status,
    Type,
    Zone,
}

impl FieldSelector for DiskField {
    fn selector(&self) -> &'static str {
        match self {
            Self::CreationTimestamp => "creationTimestamp",
            Self::Id => "id",
            Self::Name => "name",
            Self::SizeGb => "sizeGb",
            Self::SourceImage => "sourceImage",
            Self::SourceSnapshot => "sourceSnapshot",
            Self::Status => "status",
            Self::Type => "type",
            Self::Zone => "zone",
        }
    }
}

/// A snapshot attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotField {
    CreationTimestamp,
    DiskSizeGb,
    Id,
    Name,
    SourceDisk,
    Status,
    StorageBytes,
}

impl FieldSelector for SnapshotField {
    fn selector(&self) -> &'static str {
        match self {
            Self::CreationTimestamp => "creationTimestamp",
            Self::DiskSizeGb => "diskSizeGb",
            Self::Id => "id",
            Self::Name => "name",
            Self::SourceDisk => "sourceDisk",
            Self::Status => "status",
            Self::StorageBytes => "storageBytes",
        }
    }
}

/// An image attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageField {
    ArchiveSizeBytes,
    CreationTimestamp,
    Deprecated,
    DiskSizeGb,
    Id,
    Name,
    SourceDisk,
    Status,
}

impl FieldSelector for ImageField {
    fn selector(&self) -> &'static str {
        match self {
            Self::ArchiveSizeBytes => "archiveSizeBytes",
            Self::CreationTimestamp => "creationTimestamp",
            Self::Deprecated => "deprecated",
            Self::DiskSizeGb => "diskSizeGb",
            Self::Id => "id",
            Self::Name => "name",
            Self::SourceDisk => "sourceDisk",
            Self::Status => "status",
        }
    }
}

/// An operation attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationField {
    EndTime,
    Id,
    InsertTime,
    Name,
    OperationType,
    Progress,
    StartTime,
    Status,
}

impl FieldSelector for OperationField {
    fn selector(&self) -> &'static str {
        match self {
            Self::EndTime => "endTime",
            Self::Id => "id",
            Self::InsertTime => "insertTime",
            Self::Name => "name",
            Self::OperationType => "operationType",
            Self::Progress => "progress",
            Self::StartTime => "startTime",
            Self::Status => "status",
        }
    }
}

/// A value on the right-hand side of a filter expression.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    String(String),
    Number(i64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Number(v.into())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A `{field} {op} {value}` filter expression for list calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    expression: String,
}

impl Filter {
    pub fn eq<F: FieldSelector, V: Into<FilterValue>>(field: F, value: V) -> Self {
        Self::binary(field, "eq", value.into())
    }

    pub fn ne<F: FieldSelector, V: Into<FilterValue>>(field: F, value: V) -> Self {
        Self::binary(field, "ne", value.into())
    }

    fn binary<F: FieldSelector>(field: F, op: &str, value: FilterValue) -> Self {
        Self {
            expression: format!("{} {op} {value}", field.selector()),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// An option for get calls.
#[derive(Clone, Debug, PartialEq)]
pub enum GetOption<F> {
    Fields(Vec<F>),
}

impl<F: FieldSelector> GetOption<F> {
    pub fn fields<I: IntoIterator<Item = F>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

/// An option for list calls.
#[derive(Clone, Debug, PartialEq)]
pub enum ListOption<F> {
    PageSize(i32),
    PageToken(String),
    Filter(Filter),
    Fields(Vec<F>),
}

impl<F: FieldSelector> ListOption<F> {
    pub fn page_size(size: i32) -> Self {
        Self::PageSize(size)
    }

    pub fn page_token<S: Into<String>>(token: S) -> Self {
        Self::PageToken(token.into())
    }

    pub fn filter(filter: Filter) -> Self {
        Self::Filter(filter)
    }

    pub fn fields<I: IntoIterator<Item = F>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

pub type AddressOption = GetOption<AddressField>;
pub type AddressListOption = ListOption<AddressField>;
pub type DiskOption = GetOption<DiskField>;
pub type DiskListOption = ListOption<DiskField>;
pub type SnapshotOption = GetOption<SnapshotField>;
pub type SnapshotListOption = ListOption<SnapshotField>;
pub type ImageOption = GetOption<ImageField>;
pub type ImageListOption = ListOption<ImageField>;
pub type OperationListOption = ListOption<OperationField>;

/// Joins `selfLink` and the requested selectors, skipping duplicates.
fn selector<F: FieldSelector>(fields: &[F]) -> String {
    let mut parts = vec!["selfLink"];
    for f in fields {
        let s = f.selector();
        if !parts.contains(&s) {
            parts.push(s);
        }
    }
    parts.join(",")
}

pub(crate) fn get_options<F: FieldSelector>(options: &[GetOption<F>]) -> RpcOptions {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            GetOption::Fields(fields) => {
                map.insert(RpcOption::Fields, selector(fields).into());
            }
        }
    }
    map
}

pub(crate) fn list_options<F: FieldSelector>(options: &[ListOption<F>]) -> RpcOptions {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            ListOption::PageSize(size) => {
                map.insert(RpcOption::MaxResults, (*size).into());
            }
            ListOption::PageToken(token) => {
                map.insert(RpcOption::PageToken, token.clone().into());
            }
            ListOption::Filter(filter) => {
                map.insert(RpcOption::Filter, filter.expression().into());
            }
            ListOption::Fields(fields) => {
                map.insert(
                    RpcOption::Fields,
                    format!("nextPageToken,items({})", selector(fields)).into(),
                );
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_fields_always_request_the_self_link() {
        let resolved = get_options(&[AddressOption::fields([])]);
        assert_eq!(resolved[&RpcOption::Fields], "selfLink");

        let resolved = get_options(&[AddressOption::fields([AddressField::Address])]);
        assert_eq!(resolved[&RpcOption::Fields], "selfLink,address");
    }

    #[test]
    fn get_fields_skip_duplicates() {
        let resolved = get_options(&[DiskOption::fields([
            DiskField::SizeGb,
            DiskField::SizeGb,
            DiskField::Status,
        ])]);
        assert_eq!(resolved[&RpcOption::Fields], "selfLink,sizeGb,status");
    }

    #[test]
    fn list_fields_wrap_the_item_selector() {
        let resolved = list_options(&[SnapshotListOption::fields([
            SnapshotField::CreationTimestamp,
        ])]);
        assert_eq!(
            resolved[&RpcOption::Fields],
            "nextPageToken,items(selfLink,creationTimestamp)"
        );
    }

    #[test]
    fn list_paging_options() {
        let resolved = list_options::<DiskField>(&[
            DiskListOption::page_size(25),
            DiskListOption::page_token("cursor"),
        ]);
        assert_eq!(resolved[&RpcOption::MaxResults], 25);
        assert_eq!(resolved[&RpcOption::PageToken], "cursor");
    }

    #[test]
    fn filters_quote_strings() {
        let filter = Filter::eq(AddressField::Name, "my-address");
        assert_eq!(filter.expression(), "name eq \"my-address\"");

        let resolved = list_options(&[AddressListOption::filter(filter)]);
        assert_eq!(resolved[&RpcOption::Filter], "name eq \"my-address\"");
    }

    #[test]
    fn filters_leave_numbers_bare() {
        assert_eq!(
            Filter::ne(DiskField::SizeGb, 375_i64).expression(),
            "sizeGb ne 375"
        );
        assert_eq!(
            Filter::eq(ImageField::ArchiveSizeBytes, 365056004_i64).expression(),
            "archiveSizeBytes eq 365056004"
        );
        assert_eq!(
            Filter::eq(OperationField::Status, "DONE").expression(),
            "status eq \"DONE\""
        );
    }
}
