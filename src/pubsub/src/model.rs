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

//! Value objects mirroring the Pub/Sub resource schema.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicInfo {
    name: String,
}

impl TopicInfo {
    pub fn of<N: Into<String>>(name: N) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Where and how the service pushes a subscription's messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushConfig {
    push_endpoint: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl PushConfig {
    pub fn of<E: Into<String>>(push_endpoint: E) -> Self {
        Self {
            push_endpoint: push_endpoint.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attributes<E: Into<String>>(
        push_endpoint: E,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            push_endpoint: push_endpoint.into(),
            attributes,
        }
    }

    pub fn push_endpoint(&self) -> &str {
        &self.push_endpoint
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Information about a subscription.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionInfo {
    name: String,
    topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    push_config: Option<PushConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ack_deadline_seconds: Option<i32>,
}

impl SubscriptionInfo {
    /// Creates a pull subscription on `topic`.
    pub fn of<T: Into<String>, N: Into<String>>(topic: T, name: N) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            push_config: None,
            ack_deadline_seconds: None,
        }
    }

    pub fn builder<T: Into<String>, N: Into<String>>(topic: T, name: N) -> SubscriptionInfoBuilder {
        SubscriptionInfoBuilder {
            info: Self::of(topic, name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The push delivery configuration. `None` for pull subscriptions.
    pub fn push_config(&self) -> Option<&PushConfig> {
        self.push_config.as_ref()
    }

    /// How long the service waits for an ack before redelivering.
    pub fn ack_deadline_seconds(&self) -> Option<i32> {
        self.ack_deadline_seconds
    }
}

/// Builds [SubscriptionInfo] instances.
#[derive(Clone, Debug)]
pub struct SubscriptionInfoBuilder {
    info: SubscriptionInfo,
}

impl SubscriptionInfoBuilder {
    pub fn set_push_config(mut self, v: PushConfig) -> Self {
        self.info.push_config = Some(v);
        self
    }

    pub fn set_ack_deadline_seconds(mut self, v: i32) -> Self {
        self.info.ack_deadline_seconds = Some(v);
        self
    }

    pub fn build(self) -> SubscriptionInfo {
        self.info
    }
}

/// A message to publish, or the payload of a received one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    data: Bytes,
    attributes: BTreeMap<String, String>,
    message_id: Option<String>,
}

impl Message {
    pub fn of<D: Into<Bytes>>(data: D) -> Self {
        Self {
            data: data.into(),
            attributes: BTreeMap::new(),
            message_id: None,
        }
    }

    pub fn with_attributes<D: Into<Bytes>>(data: D, attributes: BTreeMap<String, String>) -> Self {
        Self {
            data: data.into(),
            attributes,
            message_id: None,
        }
    }

    /// Used by transports to attach the service-assigned id.
    pub fn set_message_id<V: Into<String>>(mut self, v: V) -> Self {
        self.message_id = Some(v.into());
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// The service-assigned id, present on received messages.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

/// A pulled message with the id needed to acknowledge it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_builder() {
        let info = SubscriptionInfo::builder("projects/p/topics/t", "projects/p/subscriptions/s")
            .set_ack_deadline_seconds(30)
            .build();
        assert_eq!(info.topic(), "projects/p/topics/t");
        assert_eq!(info.name(), "projects/p/subscriptions/s");
        assert_eq!(info.ack_deadline_seconds(), Some(30));
        assert_eq!(info.push_config(), None);

        let push = SubscriptionInfo::builder("projects/p/topics/t", "projects/p/subscriptions/s")
            .set_push_config(PushConfig::of("https://example.com/push"))
            .build();
        assert_eq!(
            push.push_config().map(PushConfig::push_endpoint),
            Some("https://example.com/push")
        );
    }

    #[test]
    fn message_round_trip() {
        let m = Message::with_attributes(
            "payload",
            BTreeMap::from([("k".to_string(), "v".to_string())]),
        );
        assert_eq!(m.data().as_ref(), b"payload");
        assert_eq!(m.attributes().get("k").map(String::as_str), Some("v"));
        assert_eq!(m.message_id(), None);
        let m = m.set_message_id("id-1");
        assert_eq!(m.message_id(), Some("id-1"));
    }
}
