//! What to subscribe to and how fast the server may deliver.

use crate::wire::SubRequest;

/// Subscription request: topic pattern plus advisory flow-control hints.
///
/// The topic is a literal name, `*` for every topic, or `prefix.*` for a
/// namespace. Setters mutate in place and clamp negative input to 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeOptions {
    topic: String,
    batch: i64,
    speed_per_sec: i64,
}

impl SubscribeOptions {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            batch: 0,
            speed_per_sec: 0,
        }
    }

    /// Maximum messages per server push; 0 uses the server default.
    pub fn with_batch(&mut self, batch: i64) -> &mut Self {
        self.batch = batch.max(0);
        self
    }

    /// Maximum delivery rate in messages per second; 0 is unlimited.
    pub fn with_speed_per_sec(&mut self, speed_per_sec: i64) -> &mut Self {
        self.speed_per_sec = speed_per_sec.max(0);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn batch(&self) -> i64 {
        self.batch
    }

    pub fn speed_per_sec(&self) -> i64 {
        self.speed_per_sec
    }

    pub(crate) fn to_wire(&self) -> SubRequest {
        SubRequest {
            topic: self.topic.clone(),
            batch: self.batch,
            speed_per_sec: self.speed_per_sec,
        }
    }
}
