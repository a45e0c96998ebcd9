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

//! The transport seam between the Pub/Sub client and the wire.

use crate::model::{Message, PushConfig, ReceivedMessage, SubscriptionInfo, TopicInfo};
use gax::Result;

/// Paging parameters for list calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page_size: Option<i32>,
    pub page_token: Option<String>,
}

/// One page of a list response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }
}

/// The transport operations the Pub/Sub client is built on.
///
/// `get_*` resolves to `Ok(None)` when the resource does not exist and
/// `delete_*` to `Ok(false)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PubSubRpc: Send + Sync {
    async fn create_topic(&self, topic: TopicInfo) -> Result<TopicInfo>;

    async fn get_topic(&self, name: String) -> Result<Option<TopicInfo>>;

    async fn list_topics(&self, params: PageParams) -> Result<ListResult<TopicInfo>>;

    async fn delete_topic(&self, name: String) -> Result<bool>;

    /// Publishes `messages` to a topic and returns the assigned message
    /// ids, in message order.
    async fn publish(&self, topic: String, messages: Vec<Message>) -> Result<Vec<String>>;

    async fn create_subscription(
        &self,
        subscription: SubscriptionInfo,
    ) -> Result<SubscriptionInfo>;

    async fn get_subscription(&self, name: String) -> Result<Option<SubscriptionInfo>>;

    async fn list_subscriptions(
        &self,
        params: PageParams,
    ) -> Result<ListResult<SubscriptionInfo>>;

    async fn delete_subscription(&self, name: String) -> Result<bool>;

    /// Changes where a subscription's messages are pushed. `None` switches
    /// the subscription to pull delivery.
    async fn modify_push_config(
        &self,
        subscription: String,
        push_config: Option<PushConfig>,
    ) -> Result<()>;

    /// Pulls up to `max_messages` from a subscription. With
    /// `return_immediately` the service answers even when nothing is
    /// queued, instead of holding the request open.
    async fn pull(
        &self,
        subscription: String,
        max_messages: i32,
        return_immediately: bool,
    ) -> Result<Vec<ReceivedMessage>>;

    async fn acknowledge(&self, subscription: String, ack_ids: Vec<String>) -> Result<()>;

    /// Extends or shortens the ack deadline of outstanding messages. A
    /// deadline of zero makes them immediately available for redelivery.
    async fn modify_ack_deadline(
        &self,
        subscription: String,
        ack_ids: Vec<String>,
        deadline_seconds: i32,
    ) -> Result<()>;
}
