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

//! The Cloud Storage client.
//!
//! The client translates the typed surface into transport requests: it
//! resolves option slices into wire parameter maps, wraps every RPC in the
//! retry loop, and assembles the multi-call operations (rewrite
//! continuation, batch fan-out) from single RPCs.
//!
//! Mutations are retried only when the request carries a precondition, so a
//! retried attempt that raced an unrelated writer fails instead of
//! overwriting.

use crate::copy_writer::CopyWriter;
use crate::model::{BlobId, BlobInfo, BucketInfo};
use crate::option::{
    BlobGetOption, BlobListOption, BlobSourceOption, BlobTargetOption, BucketGetOption,
    BucketListOption, BucketSourceOption, BucketTargetOption, blob_copy_source_options,
    blob_get_options, blob_list_options, blob_source_options, blob_target_options,
    bucket_get_options, bucket_list_options, bucket_source_options, bucket_target_options,
};
use crate::retry_policy::StorageRetryPolicy;
use crate::rpc::{
    BatchRequest, ListResult, RewriteRequest, RpcOption, RpcOptions, StorageRpc,
};
use crate::signed_url::{SignUrlOption, SigningCredentials, sign_url};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use gax::backoff_policy::BackoffPolicy;
use gax::clock::{Clock, SystemClock};
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoff;
use gax::options::RequestOptions;
use gax::paginator::{PageableResponse, Paginator};
use gax::retry::retry_loop;
use gax::retry_policy::{RetryPolicy, RetryPolicyExt as _};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// The default attempt limit, matching the service's recommended client
/// configuration.
const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// One page of a listing, with the token to fetch the next one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl<T> From<ListResult<T>> for Page<T> {
    fn from(r: ListResult<T>) -> Self {
        Self {
            items: r.items,
            next_page_token: r.next_page_token,
        }
    }
}

impl<T> PageableResponse for Page<T> {
    fn next_page_token(&self) -> String {
        self.next_page_token.clone().unwrap_or_default()
    }
}

/// A request to copy a blob, possibly across buckets.
///
/// By default the target keeps the source's metadata. Supplying the target
/// as a [BlobInfo] replaces the metadata wholesale instead.
#[derive(Clone, Debug, PartialEq)]
pub struct CopyRequest {
    source: BlobId,
    source_options: Vec<BlobSourceOption>,
    target: BlobInfo,
    override_info: bool,
    target_options: Vec<BlobTargetOption>,
    mega_bytes_copied_per_chunk: Option<i64>,
}

impl CopyRequest {
    /// Copies `source` to `target`, keeping the source metadata.
    pub fn new(source: BlobId, target: BlobId) -> Self {
        Self {
            source,
            source_options: Vec::new(),
            target: BlobInfo::of(target),
            override_info: false,
            target_options: Vec::new(),
            mega_bytes_copied_per_chunk: None,
        }
    }

    /// Copies `source` to `target`, replacing the metadata with `target`'s.
    pub fn with_target_info(source: BlobId, target: BlobInfo) -> Self {
        Self {
            source,
            source_options: Vec::new(),
            target,
            override_info: true,
            target_options: Vec::new(),
            mega_bytes_copied_per_chunk: None,
        }
    }

    /// Preconditions checked against the source blob.
    pub fn set_source_options(mut self, options: Vec<BlobSourceOption>) -> Self {
        self.source_options = options;
        self
    }

    /// Preconditions checked against the target blob.
    pub fn set_target_options(mut self, options: Vec<BlobTargetOption>) -> Self {
        self.target_options = options;
        self
    }

    /// Caps the bytes copied per service call. Without it the service
    /// copies as much as it can in each call.
    pub fn set_mega_bytes_copied_per_chunk(mut self, mega_bytes: i64) -> Self {
        self.mega_bytes_copied_per_chunk = Some(mega_bytes);
        self
    }
}

/// A request to concatenate several blobs of a bucket into one.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeRequest {
    sources: Vec<(String, Option<i64>)>,
    target: BlobInfo,
    target_options: Vec<BlobTargetOption>,
}

impl ComposeRequest {
    pub fn new(target: BlobInfo) -> Self {
        Self {
            sources: Vec::new(),
            target,
            target_options: Vec::new(),
        }
    }

    /// Adds a source blob, taken from the target's bucket.
    pub fn add_source<N: Into<String>>(mut self, name: N) -> Self {
        self.sources.push((name.into(), None));
        self
    }

    /// Adds a source blob pinned to a specific generation.
    pub fn add_source_with_generation<N: Into<String>>(mut self, name: N, generation: i64) -> Self {
        self.sources.push((name.into(), Some(generation)));
        self
    }

    pub fn set_target_options(mut self, options: Vec<BlobTargetOption>) -> Self {
        self.target_options = options;
        self
    }
}

/// The Cloud Storage service client.
///
/// The client is a cheap handle; clones share the transport and
/// configuration.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    rpc: Arc<dyn StorageRpc>,
    credentials: Option<SigningCredentials>,
    clock: Arc<dyn Clock>,
    options: RequestOptions,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("credentials", &self.inner.credentials)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Configures and creates [Storage] clients.
pub struct StorageBuilder {
    rpc: Option<Arc<dyn StorageRpc>>,
    credentials: Option<SigningCredentials>,
    clock: Arc<dyn Clock>,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
}

impl StorageBuilder {
    fn new() -> Self {
        Self {
            rpc: None,
            credentials: None,
            clock: Arc::new(SystemClock),
            retry_policy: Arc::new(StorageRetryPolicy.with_attempt_limit(DEFAULT_MAX_ATTEMPTS)),
            backoff_policy: Arc::new(ExponentialBackoff::default()),
        }
    }

    /// Sets the transport. Required.
    pub fn with_rpc(mut self, rpc: Arc<dyn StorageRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    /// Sets the service account used by [Storage::sign_url].
    pub fn with_credentials(mut self, credentials: SigningCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_backoff_policy(mut self, policy: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff_policy = policy;
        self
    }

    pub fn build(self) -> gax::Result<Storage> {
        let rpc = self
            .rpc
            .ok_or_else(|| Error::other("a transport is required to build a client"))?;
        Ok(Storage {
            inner: Arc::new(StorageInner {
                rpc,
                credentials: self.credentials,
                clock: self.clock,
                options: RequestOptions::new(self.retry_policy, self.backoff_policy),
            }),
        })
    }
}

/// True if the map pins the request to a generation or metageneration,
/// making a duplicate attempt safe.
fn has_precondition(options: &RpcOptions) -> bool {
    options.contains_key(&RpcOption::IfGenerationMatch)
        || options.contains_key(&RpcOption::IfMetagenerationMatch)
}

impl Storage {
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    async fn with_retry<F, T>(&self, idempotent: bool, inner: F) -> gax::Result<T>
    where
        F: AsyncFnMut() -> gax::Result<T> + Send,
    {
        retry_loop(
            inner,
            idempotent,
            self.inner.options.retry_policy.clone(),
            self.inner.options.backoff_policy.clone(),
        )
        .await
    }

    pub async fn create_bucket(
        &self,
        bucket: BucketInfo,
        options: &[BucketTargetOption],
    ) -> gax::Result<BucketInfo> {
        let options = bucket_target_options(&bucket, options)?;
        let idempotent = has_precondition(&options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(idempotent, async move || {
            rpc.create_bucket(bucket.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the bucket does not exist.
    pub async fn get_bucket(
        &self,
        name: &str,
        options: &[BucketGetOption],
    ) -> gax::Result<Option<BucketInfo>> {
        let options = bucket_get_options(options);
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || {
            rpc.get_bucket(name.clone(), options.clone()).await
        })
        .await
    }

    /// Returns one page of the project's buckets.
    pub async fn list_buckets(
        &self,
        options: &[BucketListOption],
    ) -> gax::Result<Page<BucketInfo>> {
        self.list_buckets_resolved(bucket_list_options(options)).await
    }

    /// Streams all pages of the project's buckets.
    pub fn list_buckets_stream(
        &self,
        options: &[BucketListOption],
    ) -> Paginator<Page<BucketInfo>, Error> {
        let client = self.clone();
        let base = bucket_list_options(options);
        Paginator::new(String::new(), move |token: String| {
            let client = client.clone();
            let mut options = base.clone();
            async move {
                if !token.is_empty() {
                    options.insert(RpcOption::PageToken, token.into());
                }
                client.list_buckets_resolved(options).await
            }
        })
    }

    // Not an `async fn`: the returned future must not borrow `self`, so
    // the paginator closures can produce `Send + 'static` futures. Boxing
    // the retry future works around rustc's "higher-ranked lifetime error"
    // when the `Send` proof flows through the opaque return type.
    fn list_buckets_resolved(
        &self,
        options: RpcOptions,
    ) -> impl Future<Output = gax::Result<Page<BucketInfo>>> + Send {
        let rpc = self.inner.rpc.clone();
        let inner: Pin<Box<dyn Future<Output = gax::Result<ListResult<BucketInfo>>> + Send>> =
            Box::pin(retry_loop(
                async move || rpc.list_buckets(options.clone()).await,
                true,
                self.inner.options.retry_policy.clone(),
                self.inner.options.backoff_policy.clone(),
            ));
        async move { inner.await.map(Page::from) }
    }

    pub async fn update_bucket(
        &self,
        bucket: BucketInfo,
        options: &[BucketTargetOption],
    ) -> gax::Result<BucketInfo> {
        let options = bucket_target_options(&bucket, options)?;
        let idempotent = has_precondition(&options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(idempotent, async move || {
            rpc.patch_bucket(bucket.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(false)` if the bucket did not exist.
    pub async fn delete_bucket(
        &self,
        name: &str,
        options: &[BucketSourceOption],
    ) -> gax::Result<bool> {
        let options = bucket_source_options(options);
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || {
            rpc.delete_bucket(name.clone(), options.clone()).await
        })
        .await
    }

    /// Uploads `content` as a new blob, or a new generation of an existing
    /// one.
    ///
    /// The MD5 hash and CRC32C checksum of `content` are computed locally
    /// and sent with the request, so the service rejects corrupted uploads.
    pub async fn create_blob<C: Into<Bytes>>(
        &self,
        blob: BlobInfo,
        content: C,
        options: &[BlobTargetOption],
    ) -> gax::Result<BlobInfo> {
        let content = content.into();
        let blob = blob
            .to_builder()
            .set_md5(BASE64.encode(md5::compute(&content).0))
            .set_crc32c(BASE64.encode(crc32c::crc32c(content.as_ref()).to_be_bytes()))
            .build();
        let options = blob_target_options(&blob, options)?;
        let idempotent = has_precondition(&options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(idempotent, async move || {
            rpc.create_blob(blob.clone(), content.clone(), options.clone())
                .await
        })
        .await
    }

    /// Returns `Ok(None)` if the blob does not exist.
    pub async fn get_blob(
        &self,
        id: BlobId,
        options: &[BlobGetOption],
    ) -> gax::Result<Option<BlobInfo>> {
        let options = blob_get_options(&id, options)?;
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || {
            rpc.get_blob(id.clone(), options.clone()).await
        })
        .await
    }

    /// Returns one page of the bucket's blobs.
    pub async fn list_blobs(
        &self,
        bucket: &str,
        options: &[BlobListOption],
    ) -> gax::Result<Page<BlobInfo>> {
        self.list_blobs_resolved(bucket.to_string(), blob_list_options(options))
            .await
    }

    /// Streams all pages of the bucket's blobs.
    pub fn list_blobs_stream(
        &self,
        bucket: &str,
        options: &[BlobListOption],
    ) -> Paginator<Page<BlobInfo>, Error> {
        let client = self.clone();
        let bucket = bucket.to_string();
        let base = blob_list_options(options);
        Paginator::new(String::new(), move |token: String| {
            let client = client.clone();
            let bucket = bucket.clone();
            let mut options = base.clone();
            async move {
                if !token.is_empty() {
                    options.insert(RpcOption::PageToken, token.into());
                }
                client.list_blobs_resolved(bucket, options).await
            }
        })
    }

    // Not an `async fn` for the same reason as `list_buckets_resolved`.
    fn list_blobs_resolved(
        &self,
        bucket: String,
        options: RpcOptions,
    ) -> impl Future<Output = gax::Result<Page<BlobInfo>>> + Send {
        let rpc = self.inner.rpc.clone();
        let inner: Pin<Box<dyn Future<Output = gax::Result<ListResult<BlobInfo>>> + Send>> =
            Box::pin(retry_loop(
                async move || rpc.list_blobs(bucket.clone(), options.clone()).await,
                true,
                self.inner.options.retry_policy.clone(),
                self.inner.options.backoff_policy.clone(),
            ));
        async move { inner.await.map(Page::from) }
    }

    pub async fn update_blob(
        &self,
        blob: BlobInfo,
        options: &[BlobTargetOption],
    ) -> gax::Result<BlobInfo> {
        let options = blob_target_options(&blob, options)?;
        let idempotent = has_precondition(&options);
        let rpc = self.inner.rpc.clone();
        self.with_retry(idempotent, async move || {
            rpc.patch_blob(blob.clone(), options.clone()).await
        })
        .await
    }

    /// Returns `Ok(false)` if the blob did not exist.
    pub async fn delete_blob(
        &self,
        id: BlobId,
        options: &[BlobSourceOption],
    ) -> gax::Result<bool> {
        let options = blob_source_options(&id, options)?;
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || {
            rpc.delete_blob(id.clone(), options.clone()).await
        })
        .await
    }

    /// Reads the full content of a blob.
    pub async fn read_all_bytes(
        &self,
        id: BlobId,
        options: &[BlobSourceOption],
    ) -> gax::Result<Bytes> {
        let options = blob_source_options(&id, options)?;
        let rpc = self.inner.rpc.clone();
        self.with_retry(true, async move || {
            rpc.load_blob(id.clone(), options.clone()).await
        })
        .await
    }

    /// Concatenates the request's sources into its target.
    pub async fn compose(&self, request: ComposeRequest) -> gax::Result<BlobInfo> {
        let sources: Vec<(String, RpcOptions)> = request
            .sources
            .into_iter()
            .map(|(name, generation)| {
                let mut options = RpcOptions::new();
                if let Some(g) = generation {
                    options.insert(RpcOption::IfGenerationMatch, g.into());
                }
                (name, options)
            })
            .collect();
        let target_options = blob_target_options(&request.target, &request.target_options)?;
        let idempotent = has_precondition(&target_options);
        let target = request.target;
        let rpc = self.inner.rpc.clone();
        self.with_retry(idempotent, async move || {
            rpc.compose(sources.clone(), target.clone(), target_options.clone())
                .await
        })
        .await
    }

    /// Starts a copy and performs its first service call.
    ///
    /// The returned [CopyWriter] drives the remaining calls; most callers
    /// go straight to [CopyWriter::result].
    pub async fn copy(&self, request: CopyRequest) -> gax::Result<CopyWriter> {
        let source_options = blob_copy_source_options(&request.source, &request.source_options)?;
        let target_options = blob_target_options(&request.target, &request.target_options)?;
        let idempotent = has_precondition(&target_options);
        let rewrite = RewriteRequest {
            source: request.source,
            source_options,
            target: request.target,
            override_info: request.override_info,
            target_options,
            max_bytes_rewritten_per_call: request
                .mega_bytes_copied_per_chunk
                .map(|mb| mb * 1024 * 1024),
        };
        let rpc = self.inner.rpc.clone();
        let state = self
            .with_retry(idempotent, async move || {
                rpc.open_rewrite(rewrite.clone()).await
            })
            .await?;
        Ok(CopyWriter::new(
            self.inner.rpc.clone(),
            self.inner.options.clone(),
            state,
        ))
    }

    /// Fetches several blobs in one RPC.
    ///
    /// The result is in request order; entries that do not exist or fail
    /// individually are `None`.
    pub async fn get_all(&self, ids: Vec<BlobId>) -> gax::Result<Vec<Option<BlobInfo>>> {
        let request = BatchRequest {
            to_get: ids.into_iter().map(|id| (id, RpcOptions::new())).collect(),
            ..BatchRequest::default()
        };
        let response = self.batch(request).await?;
        Ok(response
            .gets
            .into_iter()
            .map(|r| r.ok().flatten())
            .collect())
    }

    /// Updates several blobs in one RPC.
    ///
    /// The result is in request order; entries that fail individually are
    /// `None`.
    pub async fn update_all(&self, blobs: Vec<BlobInfo>) -> gax::Result<Vec<Option<BlobInfo>>> {
        let request = BatchRequest {
            to_update: blobs
                .into_iter()
                .map(|blob| (blob, RpcOptions::new()))
                .collect(),
            ..BatchRequest::default()
        };
        let response = self.batch(request).await?;
        Ok(response.updates.into_iter().map(|r| r.ok()).collect())
    }

    /// Deletes several blobs in one RPC.
    ///
    /// The result is in request order; entries that did not exist or fail
    /// individually are `false`.
    pub async fn delete_all(&self, ids: Vec<BlobId>) -> gax::Result<Vec<bool>> {
        let request = BatchRequest {
            to_delete: ids.into_iter().map(|id| (id, RpcOptions::new())).collect(),
            ..BatchRequest::default()
        };
        let response = self.batch(request).await?;
        Ok(response
            .deletes
            .into_iter()
            .map(|r| r.unwrap_or(false))
            .collect())
    }

    async fn batch(&self, request: BatchRequest) -> gax::Result<crate::rpc::BatchResult> {
        // The batch itself is not retried; entries may have partially
        // executed on the service.
        self.inner.rpc.batch(request).await
    }

    /// Mints a V2 signed URL for the blob.
    ///
    /// Requires [SigningCredentials] on the client.
    pub fn sign_url(
        &self,
        blob: &BlobInfo,
        expires_in: Duration,
        options: &[SignUrlOption],
    ) -> gax::Result<url::Url> {
        let credentials = self.inner.credentials.as_ref().ok_or_else(|| {
            Error::authentication("signing a URL requires service account credentials")
        })?;
        sign_url(
            credentials,
            self.inner.clock.as_ref(),
            blob,
            expires_in,
            options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{BlobField, BucketField};
    use crate::rpc::{BatchResult, MockStorageRpc, RewriteResult};
    use gax::error::Status;
    use mockall::predicate::eq;
    use std::time::Instant;

    #[derive(Debug)]
    struct NoBackoff;
    impl BackoffPolicy for NoBackoff {
        fn on_failure(&self, _loop_start: Instant, _attempt_count: u32) -> Duration {
            Duration::from_millis(1)
        }
    }

    fn client(mock: MockStorageRpc) -> Storage {
        Storage::builder()
            .with_rpc(Arc::new(mock))
            .with_backoff_policy(Arc::new(NoBackoff))
            .build()
            .unwrap()
    }

    fn blob1() -> BlobInfo {
        BlobInfo::builder("b1", "n1").build()
    }

    #[tokio::test]
    async fn create_bucket_forwards_empty_options() {
        let info = BucketInfo::of("b1");
        let mut mock = MockStorageRpc::new();
        mock.expect_create_bucket()
            .with(eq(info.clone()), eq(RpcOptions::new()))
            .times(1)
            .returning(|bucket, _| Ok(bucket));
        let created = client(mock).create_bucket(info.clone(), &[]).await.unwrap();
        assert_eq!(created, info);
    }

    #[tokio::test]
    async fn create_bucket_resolves_preconditions() {
        let info = BucketInfo::builder("b1").set_metageneration(42).build();
        let expected = RpcOptions::from([(RpcOption::IfMetagenerationMatch, 42.into())]);
        let mut mock = MockStorageRpc::new();
        mock.expect_create_bucket()
            .with(eq(info.clone()), eq(expected))
            .times(1)
            .returning(|bucket, _| Ok(bucket));
        client(mock)
            .create_bucket(info, &[BucketTargetOption::MetagenerationMatch])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_bucket_with_options() {
        let expected = RpcOptions::from([
            (RpcOption::IfMetagenerationMatch, 42.into()),
            (RpcOption::Fields, "name,location,acl".into()),
        ]);
        let mut mock = MockStorageRpc::new();
        mock.expect_get_bucket()
            .with(eq("b1".to_string()), eq(expected))
            .times(1)
            .returning(|name, _| Ok(Some(BucketInfo::of(name))));
        let found = client(mock)
            .get_bucket(
                "b1",
                &[
                    BucketGetOption::MetagenerationMatch(42),
                    BucketGetOption::fields([BucketField::Location, BucketField::Acl]),
                ],
            )
            .await
            .unwrap();
        assert_eq!(found, Some(BucketInfo::of("b1")));
    }

    #[tokio::test]
    async fn get_bucket_missing_is_none() {
        let mut mock = MockStorageRpc::new();
        mock.expect_get_bucket()
            .times(1)
            .returning(|_, _| Ok(None));
        assert_eq!(client(mock).get_bucket("b1", &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_buckets_with_options() {
        let expected = RpcOptions::from([
            (RpcOption::MaxResults, 42.into()),
            (RpcOption::Prefix, "prefix".into()),
            (
                RpcOption::Fields,
                "nextPageToken,items(name,acl,location)".into(),
            ),
        ]);
        let mut mock = MockStorageRpc::new();
        mock.expect_list_buckets()
            .with(eq(expected))
            .times(1)
            .returning(|_| {
                Ok(ListResult::new(
                    vec![BucketInfo::of("b1"), BucketInfo::of("b2")],
                    Some("cursor".to_string()),
                ))
            });
        let page = client(mock)
            .list_buckets(&[
                BucketListOption::PageSize(42),
                BucketListOption::prefix("prefix"),
                BucketListOption::fields([BucketField::Acl, BucketField::Location]),
            ])
            .await
            .unwrap();
        assert_eq!(page.items().len(), 2);
        assert_eq!(page.next_page_token(), Some("cursor"));
    }

    #[tokio::test]
    async fn list_buckets_stream_threads_the_token() {
        let mut mock = MockStorageRpc::new();
        mock.expect_list_buckets()
            .with(eq(RpcOptions::new()))
            .times(1)
            .returning(|_| {
                Ok(ListResult::new(
                    vec![BucketInfo::of("b1")],
                    Some("cursor".to_string()),
                ))
            });
        mock.expect_list_buckets()
            .with(eq(RpcOptions::from([(
                RpcOption::PageToken,
                "cursor".into(),
            )])))
            .times(1)
            .returning(|_| Ok(ListResult::new(vec![BucketInfo::of("b2")], None)));

        let client = client(mock);
        let mut stream = client.list_buckets_stream(&[]);
        let mut names = Vec::new();
        while let Some(page) = stream.next().await {
            for b in page.unwrap().into_items() {
                names.push(b.name().to_string());
            }
        }
        assert_eq!(names, vec!["b1", "b2"]);
    }

    #[tokio::test]
    async fn delete_bucket_with_options() {
        let expected = RpcOptions::from([(RpcOption::IfMetagenerationMatch, 42.into())]);
        let mut mock = MockStorageRpc::new();
        mock.expect_delete_bucket()
            .with(eq("b1".to_string()), eq(expected))
            .times(1)
            .returning(|_, _| Ok(true));
        assert!(
            client(mock)
                .delete_bucket("b1", &[BucketSourceOption::MetagenerationMatch(42)])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn create_blob_computes_hashes() {
        let content = Bytes::from_static(&[0xD, 0xE, 0xA, 0xD]);
        let expected = blob1()
            .to_builder()
            .set_md5("O1R4G1HJSDUISJjoIYmVhQ==".to_string())
            .set_crc32c("9N3EPQ==".to_string())
            .build();
        let mut mock = MockStorageRpc::new();
        mock.expect_create_blob()
            .with(eq(expected), eq(content.clone()), eq(RpcOptions::new()))
            .times(1)
            .returning(|blob, _, _| Ok(blob));
        client(mock)
            .create_blob(blob1(), content, &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_blob_empty_content() {
        let expected = blob1()
            .to_builder()
            .set_md5("1B2M2Y8AsgTpgAmY7PhCfg==".to_string())
            .set_crc32c("AAAAAA==".to_string())
            .build();
        let mut mock = MockStorageRpc::new();
        mock.expect_create_blob()
            .with(eq(expected), eq(Bytes::new()), eq(RpcOptions::new()))
            .times(1)
            .returning(|blob, _, _| Ok(blob));
        client(mock)
            .create_blob(blob1(), Bytes::new(), &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_blob_resolves_generation_from_id() {
        let id = BlobId::with_generation("b1", "n1", 24);
        let expected = RpcOptions::from([
            (RpcOption::IfGenerationMatch, 24.into()),
            (RpcOption::IfMetagenerationMatch, 42.into()),
        ]);
        let mut mock = MockStorageRpc::new();
        mock.expect_get_blob()
            .with(eq(id.clone()), eq(expected))
            .times(1)
            .returning(|id, _| Ok(Some(BlobInfo::of(id))));
        client(mock)
            .get_blob(
                id,
                &[
                    BlobGetOption::GenerationMatch,
                    BlobGetOption::MetagenerationMatch(42),
                ],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_blobs_with_selector() {
        let expected = RpcOptions::from([(
            RpcOption::Fields,
            "nextPageToken,prefixes,items(bucket,name,contentType,md5Hash)".into(),
        )]);
        let mut mock = MockStorageRpc::new();
        mock.expect_list_blobs()
            .with(eq("b1".to_string()), eq(expected))
            .times(1)
            .returning(|_, _| Ok(ListResult::new(vec![], None)));
        let page = client(mock)
            .list_blobs(
                "b1",
                &[BlobListOption::fields([
                    BlobField::ContentType,
                    BlobField::Md5Hash,
                ])],
            )
            .await
            .unwrap();
        assert!(page.items().is_empty());
        assert_eq!(page.next_page_token(), None);
    }

    #[tokio::test]
    async fn read_all_bytes_with_options() {
        let id = BlobId::with_generation("b1", "n1", 24);
        let expected = RpcOptions::from([
            (RpcOption::IfGenerationMatch, 24.into()),
            (RpcOption::IfMetagenerationMatch, 42.into()),
        ]);
        let mut mock = MockStorageRpc::new();
        mock.expect_load_blob()
            .with(eq(id.clone()), eq(expected))
            .times(1)
            .returning(|_, _| Ok(Bytes::from_static(&[0xD, 0xE, 0xA, 0xD])));
        let content = client(mock)
            .read_all_bytes(
                id,
                &[
                    BlobSourceOption::GenerationMatch,
                    BlobSourceOption::MetagenerationMatch(42),
                ],
            )
            .await
            .unwrap();
        assert_eq!(content.as_ref(), &[0xD, 0xE, 0xA, 0xD]);
    }

    #[tokio::test]
    async fn compose_forwards_sources_in_order() {
        let target = blob1();
        let expected_sources = vec![
            ("n2".to_string(), RpcOptions::new()),
            ("n3".to_string(), RpcOptions::from([(RpcOption::IfGenerationMatch, 5.into())])),
        ];
        let mut mock = MockStorageRpc::new();
        mock.expect_compose()
            .with(eq(expected_sources), eq(target.clone()), eq(RpcOptions::new()))
            .times(1)
            .returning(|_, target, _| Ok(target));
        let request = ComposeRequest::new(target.clone())
            .add_source("n2")
            .add_source_with_generation("n3", 5);
        let composed = client(mock).compose(request).await.unwrap();
        assert_eq!(composed, target);
    }

    #[tokio::test]
    async fn copy_starts_a_rewrite() {
        let source = BlobId::of("b1", "n1");
        let target = BlobId::of("b2", "n2");
        let expected = RewriteRequest {
            source: source.clone(),
            source_options: RpcOptions::new(),
            target: BlobInfo::of(target.clone()),
            override_info: false,
            target_options: RpcOptions::new(),
            max_bytes_rewritten_per_call: None,
        };
        let mut mock = MockStorageRpc::new();
        let response = RewriteResult {
            request: expected.clone(),
            result: None,
            blob_size: 42,
            is_done: false,
            rewrite_token: Some("token".to_string()),
            total_bytes_rewritten: 21,
        };
        mock.expect_open_rewrite()
            .with(eq(expected))
            .times(1)
            .returning(move |_| Ok(response.clone()));
        let writer = client(mock)
            .copy(CopyRequest::new(source, target))
            .await
            .unwrap();
        assert_eq!(writer.blob_size(), 42);
        assert_eq!(writer.total_bytes_copied(), 21);
        assert!(!writer.is_done());
    }

    #[tokio::test]
    async fn copy_with_options_uses_source_keys() {
        let source = BlobId::with_generation("b2", "n2", 24);
        let target = BlobInfo::builder("b1", "n1")
            .set_generation(24)
            .set_metageneration(42)
            .build();
        let expected = RewriteRequest {
            source: source.clone(),
            source_options: RpcOptions::from([
                (RpcOption::IfSourceGenerationMatch, 24.into()),
                (RpcOption::IfSourceMetagenerationMatch, 42.into()),
            ]),
            target: target.clone(),
            override_info: true,
            target_options: RpcOptions::from([
                (RpcOption::IfGenerationMatch, 24.into()),
                (RpcOption::IfMetagenerationMatch, 42.into()),
            ]),
            max_bytes_rewritten_per_call: None,
        };
        let mut mock = MockStorageRpc::new();
        let response = RewriteResult {
            request: expected.clone(),
            result: None,
            blob_size: 42,
            is_done: false,
            rewrite_token: Some("token".to_string()),
            total_bytes_rewritten: 21,
        };
        mock.expect_open_rewrite()
            .with(eq(expected))
            .times(1)
            .returning(move |_| Ok(response.clone()));
        let request = CopyRequest::with_target_info(source, target)
            .set_source_options(vec![
                BlobSourceOption::GenerationMatch,
                BlobSourceOption::MetagenerationMatch(42),
            ])
            .set_target_options(vec![
                BlobTargetOption::GenerationMatch,
                BlobTargetOption::MetagenerationMatch,
            ]);
        let writer = client(mock).copy(request).await.unwrap();
        assert!(!writer.is_done());
    }

    #[tokio::test]
    async fn copy_continues_until_done() {
        let source = BlobId::of("b1", "n1");
        let target = BlobId::of("b2", "n2");
        let request = RewriteRequest {
            source: source.clone(),
            source_options: RpcOptions::new(),
            target: BlobInfo::of(target.clone()),
            override_info: false,
            target_options: RpcOptions::new(),
            max_bytes_rewritten_per_call: None,
        };
        let first = RewriteResult {
            request: request.clone(),
            result: None,
            blob_size: 42,
            is_done: false,
            rewrite_token: Some("token".to_string()),
            total_bytes_rewritten: 21,
        };
        let done = RewriteResult {
            request: request.clone(),
            result: Some(BlobInfo::of(target.clone())),
            blob_size: 42,
            is_done: true,
            rewrite_token: Some("token".to_string()),
            total_bytes_rewritten: 42,
        };
        let mut mock = MockStorageRpc::new();
        let response = first.clone();
        mock.expect_open_rewrite()
            .with(eq(request))
            .times(1)
            .returning(move |_| Ok(response.clone()));
        let response = done.clone();
        mock.expect_continue_rewrite()
            .with(eq(first))
            .times(1)
            .returning(move |_| Ok(response.clone()));

        let mut writer = client(mock)
            .copy(CopyRequest::new(source, target.clone()))
            .await
            .unwrap();
        assert_eq!(writer.total_bytes_copied(), 21);
        assert!(!writer.is_done());
        let blob = writer.result().await.unwrap();
        assert_eq!(blob, BlobInfo::of(target));
        assert!(writer.is_done());
        assert_eq!(writer.total_bytes_copied(), 42);
        assert_eq!(writer.blob_size(), 42);
    }

    #[tokio::test]
    async fn get_all_fans_out_in_order() {
        let id1 = BlobId::of("b1", "n1");
        let id2 = BlobId::of("b1", "n2");
        let ids = vec![id1.clone(), id2.clone()];
        let mut mock = MockStorageRpc::new();
        mock.expect_batch()
            .withf(move |req| {
                req.to_delete.is_empty()
                    && req.to_update.is_empty()
                    && req.to_get.iter().map(|(id, _)| id).eq([&id1, &id2])
                    && req.to_get.iter().all(|(_, o)| o.is_empty())
            })
            .times(1)
            .returning(|req| {
                Ok(BatchResult {
                    gets: req
                        .to_get
                        .into_iter()
                        .map(|(id, _)| Ok(Some(BlobInfo::of(id))))
                        .collect(),
                    ..BatchResult::default()
                })
            });
        let found = client(mock).get_all(ids.clone()).await.unwrap();
        let found_ids: Vec<_> = found
            .into_iter()
            .map(|b| b.unwrap().blob_id())
            .collect();
        assert_eq!(found_ids, ids);
    }

    #[tokio::test]
    async fn update_all_maps_entry_failures_to_none() {
        let blob2 = BlobInfo::builder("b1", "n2").build();
        let mut mock = MockStorageRpc::new();
        mock.expect_batch()
            .withf(|req| req.to_update.len() == 2 && req.to_get.is_empty())
            .times(1)
            .returning(|req| {
                let mut updates: Vec<gax::Result<BlobInfo>> = req
                    .to_update
                    .into_iter()
                    .map(|(blob, _)| Ok(blob))
                    .collect();
                updates[1] = Err(Error::service(Status::new(404, "not found")));
                Ok(BatchResult {
                    updates,
                    ..BatchResult::default()
                })
            });
        let updated = client(mock)
            .update_all(vec![blob1(), blob2])
            .await
            .unwrap();
        assert_eq!(updated[0], Some(blob1()));
        assert_eq!(updated[1], None);
    }

    #[tokio::test]
    async fn delete_all_maps_entry_failures_to_false() {
        let mut mock = MockStorageRpc::new();
        mock.expect_batch()
            .withf(|req| req.to_delete.len() == 2 && req.to_update.is_empty())
            .times(1)
            .returning(|_| {
                Ok(BatchResult {
                    deletes: vec![Ok(true), Err(Error::service(Status::new(404, "not found")))],
                    ..BatchResult::default()
                })
            });
        let deleted = client(mock)
            .delete_all(vec![BlobId::of("b1", "n1"), BlobId::of("b1", "n2")])
            .await
            .unwrap();
        assert_eq!(deleted, vec![true, false]);
    }

    #[tokio::test]
    async fn retryable_error_then_success() {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockStorageRpc::new();
        mock.expect_get_blob()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(Error::service(Status::new(500, "internalError"))));
        mock.expect_get_blob()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(Some(BlobInfo::of(id))));
        let found = client(mock)
            .get_blob(BlobId::of("b1", "n1"), &[])
            .await
            .unwrap();
        assert_eq!(found, Some(blob1()));
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let mut mock = MockStorageRpc::new();
        mock.expect_get_blob()
            .times(1)
            .returning(|_, _| Err(Error::service(Status::new(501, "Not Implemented"))));
        let err = client(mock)
            .get_blob(BlobId::of("b1", "n1"), &[])
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), Some(501));
        assert!(err.to_string().contains("Not Implemented"), "{err}");
    }

    #[tokio::test]
    async fn mutations_without_preconditions_are_not_retried() {
        let mut mock = MockStorageRpc::new();
        mock.expect_patch_blob()
            .times(1)
            .returning(|_, _| Err(Error::service(Status::new(503, "unavailable"))));
        let err = client(mock).update_blob(blob1(), &[]).await.unwrap_err();
        assert_eq!(err.http_status_code(), Some(503));
    }

    #[test]
    fn sign_url_requires_credentials() {
        let client = client(MockStorageRpc::new());
        let err = client
            .sign_url(&blob1(), Duration::from_secs(60), &[])
            .unwrap_err();
        assert!(err.is_authentication());
    }
}
