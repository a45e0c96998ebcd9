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

//! The Pub/Sub client.
//!
//! Reads and deletes are retried on transient failures; creates and
//! publishes are not, because the first attempt may have been applied and a
//! duplicate would create a second resource or message.

use crate::model::{Message, PushConfig, ReceivedMessage, SubscriptionInfo, TopicInfo};
use crate::retry_policy::PubSubRetryPolicy;
use crate::rpc::{ListResult, PageParams, PubSubRpc};
use gax::backoff_policy::BackoffPolicy;
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoffBuilder;
use gax::options::RequestOptions;
use gax::paginator::{PageableResponse, Paginator};
use gax::retry::retry_loop;
use gax::retry_policy::{RetryPolicy, RetryPolicyExt as _};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// The default backoff and retry window, matching the service's published
/// client configuration.
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_MAXIMUM_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_SCALING: f64 = 1.2;
const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(45);

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

/// An option for list calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListOption {
    PageSize(i32),
    PageToken(String),
}

impl ListOption {
    pub fn page_token<S: Into<String>>(token: S) -> Self {
        Self::PageToken(token.into())
    }
}

fn page_params(options: &[ListOption]) -> PageParams {
    let mut params = PageParams::default();
    for opt in options {
        match opt {
            ListOption::PageSize(n) => params.page_size = Some(*n),
            ListOption::PageToken(t) => params.page_token = Some(t.clone()),
        }
    }
    params
}

/// The Pub/Sub service client.
///
/// The client is a cheap handle; clones share the transport and
/// configuration.
#[derive(Clone)]
pub struct PubSub {
    inner: Arc<PubSubInner>,
}

struct PubSubInner {
    rpc: Arc<dyn PubSubRpc>,
    options: RequestOptions,
}

impl std::fmt::Debug for PubSub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSub")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Configures and creates [PubSub] clients.
pub struct PubSubBuilder {
    rpc: Option<Arc<dyn PubSubRpc>>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
}

impl PubSubBuilder {
    fn new() -> Self {
        Self {
            rpc: None,
            retry_policy: None,
            backoff_policy: None,
        }
    }

    /// Sets the transport. Required.
    pub fn with_rpc(mut self, rpc: Arc<dyn PubSubRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_backoff_policy(mut self, policy: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff_policy = Some(policy);
        self
    }

    pub fn build(self) -> gax::Result<PubSub> {
        let rpc = self
            .rpc
            .ok_or_else(|| Error::other("a transport is required to build a client"))?;
        let retry_policy = match self.retry_policy {
            Some(p) => p,
            None => Arc::new(PubSubRetryPolicy.with_time_limit(DEFAULT_TOTAL_TIMEOUT)),
        };
        let backoff_policy = match self.backoff_policy {
            Some(p) => p,
            None => Arc::new(
                ExponentialBackoffBuilder::new()
                    .with_initial_delay(DEFAULT_INITIAL_DELAY)
                    .with_maximum_delay(DEFAULT_MAXIMUM_DELAY)
                    .with_scaling(DEFAULT_SCALING)
                    .build()
                    .map_err(Error::other)?,
            ),
        };
        Ok(PubSub {
            inner: Arc::new(PubSubInner {
                rpc,
                options: RequestOptions::new(retry_policy, backoff_policy),
            }),
        })
    }
}

impl PubSub {
    pub fn builder() -> PubSubBuilder {
        PubSubBuilder::new()
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

    pub async fn create_topic(&self, topic: TopicInfo) -> gax::Result<TopicInfo> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || rpc.create_topic(topic.clone()).await)
            .await
    }

    /// Returns `Ok(None)` if the topic does not exist.
    pub async fn get_topic(&self, name: &str) -> gax::Result<Option<TopicInfo>> {
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || rpc.get_topic(name.clone()).await)
            .await
    }

    /// Returns one page of the project's topics.
    pub async fn list_topics(&self, options: &[ListOption]) -> gax::Result<Page<TopicInfo>> {
        self.list_topics_resolved(page_params(options)).await
    }

    /// Streams all pages of the project's topics.
    pub fn list_topics_stream(&self, options: &[ListOption]) -> Paginator<Page<TopicInfo>, Error> {
        let client = self.clone();
        let base = page_params(options);
        Paginator::new(String::new(), move |token: String| {
            let client = client.clone();
            let mut params = base.clone();
            async move {
                if !token.is_empty() {
                    params.page_token = Some(token);
                }
                client.list_topics_resolved(params).await
            }
        })
    }

    // Not an `async fn`: the returned future must not borrow `self`, so
    // the paginator closures can produce `Send + 'static` futures. Boxing
    // the retry future works around rustc's "higher-ranked lifetime error"
    // when the `Send` proof flows through the opaque return type.
    fn list_topics_resolved(
        &self,
        params: PageParams,
    ) -> impl Future<Output = gax::Result<Page<TopicInfo>>> + Send {
        let rpc = self.inner.rpc.clone();
        let inner: Pin<Box<dyn Future<Output = gax::Result<ListResult<TopicInfo>>> + Send>> =
            Box::pin(retry_loop(
                async move || rpc.list_topics(params.clone()).await,
                true,
                self.inner.options.retry_policy.clone(),
                self.inner.options.backoff_policy.clone(),
            ));
        async move { inner.await.map(Page::from) }
    }

    /// Returns `Ok(false)` if the topic did not exist.
    pub async fn delete_topic(&self, name: &str) -> gax::Result<bool> {
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || rpc.delete_topic(name.clone()).await)
            .await
    }

    /// Publishes `messages` and returns the assigned ids, in message order.
    pub async fn publish(&self, topic: &str, messages: Vec<Message>) -> gax::Result<Vec<String>> {
        let rpc = self.inner.rpc.clone();
        let topic = topic.to_string();
        self.with_retry(false, async move || {
            rpc.publish(topic.clone(), messages.clone()).await
        })
        .await
    }

    pub async fn create_subscription(
        &self,
        subscription: SubscriptionInfo,
    ) -> gax::Result<SubscriptionInfo> {
        let rpc = self.inner.rpc.clone();
        self.with_retry(false, async move || {
            rpc.create_subscription(subscription.clone()).await
        })
        .await
    }

    /// Returns `Ok(None)` if the subscription does not exist.
    pub async fn get_subscription(&self, name: &str) -> gax::Result<Option<SubscriptionInfo>> {
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || rpc.get_subscription(name.clone()).await)
            .await
    }

    /// Returns one page of the project's subscriptions.
    pub async fn list_subscriptions(
        &self,
        options: &[ListOption],
    ) -> gax::Result<Page<SubscriptionInfo>> {
        self.list_subscriptions_resolved(page_params(options)).await
    }

    /// Streams all pages of the project's subscriptions.
    pub fn list_subscriptions_stream(
        &self,
        options: &[ListOption],
    ) -> Paginator<Page<SubscriptionInfo>, Error> {
        let client = self.clone();
        let base = page_params(options);
        Paginator::new(String::new(), move |token: String| {
            let client = client.clone();
            let mut params = base.clone();
            async move {
                if !token.is_empty() {
                    params.page_token = Some(token);
                }
                client.list_subscriptions_resolved(params).await
            }
        })
    }

    // Not an `async fn` for the same reason as `list_topics_resolved`.
    fn list_subscriptions_resolved(
        &self,
        params: PageParams,
    ) -> impl Future<Output = gax::Result<Page<SubscriptionInfo>>> + Send {
        let rpc = self.inner.rpc.clone();
        let inner: Pin<Box<dyn Future<Output = gax::Result<ListResult<SubscriptionInfo>>> + Send>> =
            Box::pin(retry_loop(
                async move || rpc.list_subscriptions(params.clone()).await,
                true,
                self.inner.options.retry_policy.clone(),
                self.inner.options.backoff_policy.clone(),
            ));
        async move { inner.await.map(Page::from) }
    }

    /// Returns `Ok(false)` if the subscription did not exist.
    pub async fn delete_subscription(&self, name: &str) -> gax::Result<bool> {
        let rpc = self.inner.rpc.clone();
        let name = name.to_string();
        self.with_retry(true, async move || {
            rpc.delete_subscription(name.clone()).await
        })
        .await
    }

    /// Changes where a subscription's messages are pushed.
    ///
    /// Passing `None` switches the subscription to pull delivery.
    pub async fn modify_push_config(
        &self,
        subscription: &str,
        push_config: Option<PushConfig>,
    ) -> gax::Result<()> {
        let rpc = self.inner.rpc.clone();
        let subscription = subscription.to_string();
        self.with_retry(false, async move || {
            rpc.modify_push_config(subscription.clone(), push_config.clone())
                .await
        })
        .await
    }

    /// Pulls up to `max_messages` queued messages.
    ///
    /// Returns immediately, possibly with an empty batch. Pulled messages
    /// must be acknowledged before their deadline or the service redelivers
    /// them.
    pub async fn pull(
        &self,
        subscription: &str,
        max_messages: i32,
    ) -> gax::Result<Vec<ReceivedMessage>> {
        let rpc = self.inner.rpc.clone();
        let subscription = subscription.to_string();
        self.with_retry(false, async move || {
            rpc.pull(subscription.clone(), max_messages, true).await
        })
        .await
    }

    pub async fn ack(&self, subscription: &str, ack_ids: Vec<String>) -> gax::Result<()> {
        let rpc = self.inner.rpc.clone();
        let subscription = subscription.to_string();
        self.with_retry(false, async move || {
            rpc.acknowledge(subscription.clone(), ack_ids.clone()).await
        })
        .await
    }

    /// A deadline of zero returns the messages to the queue immediately.
    pub async fn modify_ack_deadline(
        &self,
        subscription: &str,
        ack_ids: Vec<String>,
        deadline_seconds: i32,
    ) -> gax::Result<()> {
        let rpc = self.inner.rpc.clone();
        let subscription = subscription.to_string();
        self.with_retry(false, async move || {
            rpc.modify_ack_deadline(subscription.clone(), ack_ids.clone(), deadline_seconds)
                .await
        })
        .await
    }
}
