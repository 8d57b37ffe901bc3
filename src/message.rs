//! The queue entry exchanged with the broker.

use std::collections::HashMap;

use crate::wire::MqMessage;

/// One message, either built for publishing or received from a subscription.
///
/// Setters mutate in place and return `&mut Self` so calls can be chained:
///
/// ```
/// use togomq::Message;
///
/// let mut message = Message::new("orders", "order #1");
/// message
///     .with_variable("priority", "high")
///     .with_postpone(30)
///     .with_retention(7200);
///
/// assert_eq!(message.variable("priority"), Some("high"));
/// assert_eq!(message.postpone(), 30);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    topic: String,
    body: Vec<u8>,
    variables: HashMap<String, String>,
    postpone: i64,
    retention: i64,
    uuid: Option<String>,
}

impl Message {
    pub fn new(topic: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Create a message whose body is the JSON encoding of `payload`.
    pub fn json<T: serde::Serialize>(
        topic: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(topic, serde_json::to_vec(payload)?))
    }

    /// Replace the variables (custom metadata) of this message.
    pub fn with_variables<I, K, V>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add or overwrite a single variable.
    pub fn with_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Delay in seconds before the message becomes available. Negative values become 0.
    pub fn with_postpone(&mut self, seconds: i64) -> &mut Self {
        self.postpone = seconds.max(0);
        self
    }

    /// Seconds the message stays eligible for delivery; 0 is the server default.
    /// Negative values become 0.
    pub fn with_retention(&mut self, seconds: i64) -> &mut Self {
        self.retention = seconds.max(0);
        self
    }

    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> &mut Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as a string, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Decode the body as JSON.
    pub fn decode_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn variable_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.variable(key).unwrap_or(default)
    }

    pub fn postpone(&self) -> i64 {
        self.postpone
    }

    pub fn retention(&self) -> i64 {
        self.retention
    }

    /// Server-assigned identifier; only set on received messages.
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Wire form for publishing. Optional fields are sent only when set;
    /// the uuid is never sent.
    pub(crate) fn to_wire(&self) -> MqMessage {
        let mut wire = MqMessage {
            topic: self.topic.clone(),
            body: self.body.clone(),
            ..MqMessage::default()
        };
        if !self.variables.is_empty() {
            wire.variables = self.variables.clone();
        }
        if self.postpone > 0 {
            wire.postpone = self.postpone;
        }
        if self.retention > 0 {
            wire.retention = self.retention;
        }
        wire
    }
}

impl From<MqMessage> for Message {
    fn from(wire: MqMessage) -> Self {
        let mut message = Message::new(wire.topic, wire.body);
        if !wire.uuid.is_empty() {
            message.set_uuid(wire.uuid);
        }
        if !wire.variables.is_empty() {
            message.with_variables(wire.variables);
        }
        message
    }
}
