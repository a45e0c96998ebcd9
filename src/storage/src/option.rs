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
//! Each client operation accepts a slice of the matching option type. The
//! client resolves them into an [RpcOptions] map before calling the
//! transport. Value-less precondition variants pin the request to the
//! generation or metageneration already present in the resource argument,
//! and fail if the resource does not carry one.

use crate::model::{BlobId, BlobInfo, BucketInfo};
use crate::rpc::{RpcOption, RpcOptions};
use gax::error::Error;

/// A bucket attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketField {
    Id,
    Name,
    Acl,
    Location,
    StorageClass,
    Metageneration,
    TimeCreated,
    Versioning,
    Website,
}

impl BucketField {
    fn selector(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Acl => "acl",
            Self::Location => "location",
            Self::StorageClass => "storageClass",
            Self::Metageneration => "metageneration",
            Self::TimeCreated => "timeCreated",
            Self::Versioning => "versioning",
            Self::Website => "website",
        }
    }

    // The service cannot materialize a bucket without its name, so the
    // selector always requests it.
    const REQUIRED: &'static [&'static str] = &["name"];
}

/// A blob attribute selectable in a partial response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobField {
    Bucket,
    Name,
    Acl,
    Generation,
    Metageneration,
    ContentType,
    ContentEncoding,
    CacheControl,
    Size,
    Md5Hash,
    Crc32c,
    Metadata,
    TimeDeleted,
}

impl BlobField {
    fn selector(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Name => "name",
            Self::Acl => "acl",
            Self::Generation => "generation",
            Self::Metageneration => "metageneration",
            Self::ContentType => "contentType",
            Self::ContentEncoding => "contentEncoding",
            Self::CacheControl => "cacheControl",
            Self::Size => "size",
            Self::Md5Hash => "md5Hash",
            Self::Crc32c => "crc32c",
            Self::Metadata => "metadata",
            Self::TimeDeleted => "timeDeleted",
        }
    }

    const REQUIRED: &'static [&'static str] = &["bucket", "name"];
}

/// Joins required and requested selectors, skipping duplicates.
fn selector(required: &'static [&'static str], fields: &[&'static str]) -> String {
    let mut parts: Vec<&str> = required.to_vec();
    for f in fields {
        if !parts.contains(f) {
            parts.push(f);
        }
    }
    parts.join(",")
}

fn list_selector(
    top_level: &[&'static str],
    required: &'static [&'static str],
    fields: &[&'static str],
) -> String {
    format!("{},items({})", top_level.join(","), selector(required, fields))
}

fn missing_generation(id: &BlobId) -> Error {
    Error::other(format!("blob {id} has no generation to match against"))
}

fn missing_metageneration(what: &str) -> Error {
    Error::other(format!("{what} has no metageneration to match against"))
}

/// An option for bucket create and update calls.
///
/// The precondition variants are value-less: they take the metageneration
/// from the [BucketInfo] being written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketTargetOption {
    MetagenerationMatch,
    MetagenerationNotMatch,
}

pub(crate) fn bucket_target_options(
    bucket: &BucketInfo,
    options: &[BucketTargetOption],
) -> gax::Result<RpcOptions> {
    let mut map = RpcOptions::new();
    for opt in options {
        let metageneration = bucket
            .metageneration()
            .ok_or_else(|| missing_metageneration(&format!("bucket {}", bucket.name())))?;
        let key = match opt {
            BucketTargetOption::MetagenerationMatch => RpcOption::IfMetagenerationMatch,
            BucketTargetOption::MetagenerationNotMatch => RpcOption::IfMetagenerationNotMatch,
        };
        map.insert(key, metageneration.into());
    }
    Ok(map)
}

/// An option for bucket delete calls, with explicit precondition values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketSourceOption {
    MetagenerationMatch(i64),
    MetagenerationNotMatch(i64),
}

pub(crate) fn bucket_source_options(options: &[BucketSourceOption]) -> RpcOptions {
    options
        .iter()
        .map(|opt| match *opt {
            BucketSourceOption::MetagenerationMatch(v) => {
                (RpcOption::IfMetagenerationMatch, v.into())
            }
            BucketSourceOption::MetagenerationNotMatch(v) => {
                (RpcOption::IfMetagenerationNotMatch, v.into())
            }
        })
        .collect()
}

/// An option for bucket get calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BucketGetOption {
    MetagenerationMatch(i64),
    MetagenerationNotMatch(i64),
    /// Limits the response to the named fields. The bucket name is always
    /// included.
    Fields(Vec<BucketField>),
}

impl BucketGetOption {
    pub fn fields<I: IntoIterator<Item = BucketField>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

pub(crate) fn bucket_get_options(options: &[BucketGetOption]) -> RpcOptions {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            BucketGetOption::MetagenerationMatch(v) => {
                map.insert(RpcOption::IfMetagenerationMatch, (*v).into());
            }
            BucketGetOption::MetagenerationNotMatch(v) => {
                map.insert(RpcOption::IfMetagenerationNotMatch, (*v).into());
            }
            BucketGetOption::Fields(fields) => {
                let names: Vec<_> = fields.iter().map(BucketField::selector).collect();
                map.insert(
                    RpcOption::Fields,
                    selector(BucketField::REQUIRED, &names).into(),
                );
            }
        }
    }
    map
}

/// An option for bucket list calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BucketListOption {
    Prefix(String),
    PageSize(i64),
    PageToken(String),
    /// Limits each listed bucket to the named fields. The page token and
    /// the bucket name are always included.
    Fields(Vec<BucketField>),
}

impl BucketListOption {
    pub fn prefix<S: Into<String>>(prefix: S) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn page_token<S: Into<String>>(token: S) -> Self {
        Self::PageToken(token.into())
    }

    pub fn fields<I: IntoIterator<Item = BucketField>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

pub(crate) fn bucket_list_options(options: &[BucketListOption]) -> RpcOptions {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            BucketListOption::Prefix(p) => {
                map.insert(RpcOption::Prefix, p.clone().into());
            }
            BucketListOption::PageSize(n) => {
                map.insert(RpcOption::MaxResults, (*n).into());
            }
            BucketListOption::PageToken(t) => {
                map.insert(RpcOption::PageToken, t.clone().into());
            }
            BucketListOption::Fields(fields) => {
                let names: Vec<_> = fields.iter().map(BucketField::selector).collect();
                map.insert(
                    RpcOption::Fields,
                    list_selector(&["nextPageToken"], BucketField::REQUIRED, &names).into(),
                );
            }
        }
    }
    map
}

/// An option for blob create, update, and compose calls.
///
/// The precondition variants are value-less: they take the generation or
/// metageneration from the [BlobInfo] being written. `DoesNotExist` asks
/// the service to fail unless no live generation exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobTargetOption {
    GenerationMatch,
    GenerationNotMatch,
    MetagenerationMatch,
    MetagenerationNotMatch,
    DoesNotExist,
}

pub(crate) fn blob_target_options(
    blob: &BlobInfo,
    options: &[BlobTargetOption],
) -> gax::Result<RpcOptions> {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            BlobTargetOption::GenerationMatch => {
                let g = blob
                    .generation()
                    .ok_or_else(|| missing_generation(&blob.blob_id()))?;
                map.insert(RpcOption::IfGenerationMatch, g.into());
            }
            BlobTargetOption::GenerationNotMatch => {
                let g = blob
                    .generation()
                    .ok_or_else(|| missing_generation(&blob.blob_id()))?;
                map.insert(RpcOption::IfGenerationNotMatch, g.into());
            }
            BlobTargetOption::MetagenerationMatch => {
                let m = blob.metageneration().ok_or_else(|| {
                    missing_metageneration(&format!("blob {}", blob.blob_id()))
                })?;
                map.insert(RpcOption::IfMetagenerationMatch, m.into());
            }
            BlobTargetOption::MetagenerationNotMatch => {
                let m = blob.metageneration().ok_or_else(|| {
                    missing_metageneration(&format!("blob {}", blob.blob_id()))
                })?;
                map.insert(RpcOption::IfMetagenerationNotMatch, m.into());
            }
            BlobTargetOption::DoesNotExist => {
                map.insert(RpcOption::IfGenerationMatch, 0.into());
            }
        }
    }
    Ok(map)
}

/// An option for calls that read an existing blob, including the source
/// side of a copy.
///
/// `GenerationMatch` and `GenerationNotMatch` are value-less and take the
/// generation from the [BlobId] argument; the `*Value` variants carry an
/// explicit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobSourceOption {
    GenerationMatch,
    GenerationMatchValue(i64),
    GenerationNotMatch,
    GenerationNotMatchValue(i64),
    MetagenerationMatch(i64),
    MetagenerationNotMatch(i64),
}

fn resolve_blob_source(
    id: &BlobId,
    opt: &BlobSourceOption,
    as_copy_source: bool,
) -> gax::Result<(RpcOption, serde_json::Value)> {
    use BlobSourceOption::*;
    let (key, source_key, value) = match opt {
        GenerationMatch => (
            RpcOption::IfGenerationMatch,
            RpcOption::IfSourceGenerationMatch,
            id.generation()
                .ok_or_else(|| missing_generation(id))?
                .into(),
        ),
        GenerationMatchValue(v) => (
            RpcOption::IfGenerationMatch,
            RpcOption::IfSourceGenerationMatch,
            (*v).into(),
        ),
        GenerationNotMatch => (
            RpcOption::IfGenerationNotMatch,
            RpcOption::IfSourceGenerationNotMatch,
            id.generation()
                .ok_or_else(|| missing_generation(id))?
                .into(),
        ),
        GenerationNotMatchValue(v) => (
            RpcOption::IfGenerationNotMatch,
            RpcOption::IfSourceGenerationNotMatch,
            (*v).into(),
        ),
        MetagenerationMatch(v) => (
            RpcOption::IfMetagenerationMatch,
            RpcOption::IfSourceMetagenerationMatch,
            (*v).into(),
        ),
        MetagenerationNotMatch(v) => (
            RpcOption::IfMetagenerationNotMatch,
            RpcOption::IfSourceMetagenerationNotMatch,
            (*v).into(),
        ),
    };
    Ok((if as_copy_source { source_key } else { key }, value))
}

pub(crate) fn blob_source_options(
    id: &BlobId,
    options: &[BlobSourceOption],
) -> gax::Result<RpcOptions> {
    let mut map = RpcOptions::new();
    for opt in options {
        let (key, value) = resolve_blob_source(id, opt, false)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Resolves source options for a copy, where the preconditions apply to the
/// source blob and therefore use the `ifSource*` wire keys.
pub(crate) fn blob_copy_source_options(
    id: &BlobId,
    options: &[BlobSourceOption],
) -> gax::Result<RpcOptions> {
    let mut map = RpcOptions::new();
    for opt in options {
        let (key, value) = resolve_blob_source(id, opt, true)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// An option for blob get calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobGetOption {
    GenerationMatch,
    GenerationMatchValue(i64),
    GenerationNotMatch,
    GenerationNotMatchValue(i64),
    MetagenerationMatch(i64),
    MetagenerationNotMatch(i64),
    /// Limits the response to the named fields. The bucket and blob names
    /// are always included.
    Fields(Vec<BlobField>),
}

impl BlobGetOption {
    pub fn fields<I: IntoIterator<Item = BlobField>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

pub(crate) fn blob_get_options(id: &BlobId, options: &[BlobGetOption]) -> gax::Result<RpcOptions> {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            BlobGetOption::GenerationMatch => {
                let g = id.generation().ok_or_else(|| missing_generation(id))?;
                map.insert(RpcOption::IfGenerationMatch, g.into());
            }
            BlobGetOption::GenerationMatchValue(v) => {
                map.insert(RpcOption::IfGenerationMatch, (*v).into());
            }
            BlobGetOption::GenerationNotMatch => {
                let g = id.generation().ok_or_else(|| missing_generation(id))?;
                map.insert(RpcOption::IfGenerationNotMatch, g.into());
            }
            BlobGetOption::GenerationNotMatchValue(v) => {
                map.insert(RpcOption::IfGenerationNotMatch, (*v).into());
            }
            BlobGetOption::MetagenerationMatch(v) => {
                map.insert(RpcOption::IfMetagenerationMatch, (*v).into());
            }
            BlobGetOption::MetagenerationNotMatch(v) => {
                map.insert(RpcOption::IfMetagenerationNotMatch, (*v).into());
            }
            BlobGetOption::Fields(fields) => {
                let names: Vec<_> = fields.iter().map(BlobField::selector).collect();
                map.insert(
                    RpcOption::Fields,
                    selector(BlobField::REQUIRED, &names).into(),
                );
            }
        }
    }
    Ok(map)
}

/// An option for blob list calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobListOption {
    Prefix(String),
    PageSize(i64),
    PageToken(String),
    /// Limits each listed blob to the named fields. The page token, the
    /// prefixes, and the blob identity are always included.
    Fields(Vec<BlobField>),
}

impl BlobListOption {
    pub fn prefix<S: Into<String>>(prefix: S) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn page_token<S: Into<String>>(token: S) -> Self {
        Self::PageToken(token.into())
    }

    pub fn fields<I: IntoIterator<Item = BlobField>>(fields: I) -> Self {
        Self::Fields(fields.into_iter().collect())
    }
}

pub(crate) fn blob_list_options(options: &[BlobListOption]) -> RpcOptions {
    let mut map = RpcOptions::new();
    for opt in options {
        match opt {
            BlobListOption::Prefix(p) => {
                map.insert(RpcOption::Prefix, p.clone().into());
            }
            BlobListOption::PageSize(n) => {
                map.insert(RpcOption::MaxResults, (*n).into());
            }
            BlobListOption::PageToken(t) => {
                map.insert(RpcOption::PageToken, t.clone().into());
            }
            BlobListOption::Fields(fields) => {
                let names: Vec<_> = fields.iter().map(BlobField::selector).collect();
                map.insert(
                    RpcOption::Fields,
                    list_selector(&["nextPageToken", "prefixes"], BlobField::REQUIRED, &names)
                        .into(),
                );
            }
        }
    }
    map
}
