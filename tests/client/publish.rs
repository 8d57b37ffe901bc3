//! Batch publishing through the client.

use togomq::{ErrorKind, Message};
use tonic::Status;

use crate::support::in_memory_client;

#[test]
fn publishes_batch_and_returns_ack_count() {
    let (client, transport) = in_memory_client();

    let messages: Vec<Message> = (1..=10)
        .map(|i| {
            let mut message = Message::new("batch-test", format!("Batch message #{}", i));
            message.with_variable("message_number", i.to_string());
            message
        })
        .collect();

    let result = client.publish_batch(&messages).unwrap();

    assert_eq!(result.messages_received(), 10);
    assert_eq!(transport.publish_calls(), 1);
    let request = &transport.published()[0];
    assert_eq!(request.messages.len(), 10);
    assert_eq!(request.messages[9].variables["message_number"], "10");
}

#[test]
fn optional_fields_travel_only_when_set() {
    let (client, transport) = in_memory_client();

    let mut full = Message::new("orders.premium", r#"{"order_id":"ORD-12345"}"#);
    full.with_variables([("priority", "urgent"), ("region", "US-EAST")])
        .with_postpone(30)
        .with_retention(7200);
    let bare = Message::new("events", "New event");

    client.publish_batch(&[full, bare]).unwrap();

    let request = &transport.published()[0];
    let full = &request.messages[0];
    assert_eq!(full.topic, "orders.premium");
    assert_eq!(full.variables.len(), 2);
    assert_eq!(full.postpone, 30);
    assert_eq!(full.retention, 7200);
    assert!(full.uuid.is_empty());

    let bare = &request.messages[1];
    assert!(bare.variables.is_empty());
    assert_eq!(bare.postpone, 0);
    assert_eq!(bare.retention, 0);
}

#[test]
fn message_values_are_exposed_unchanged_before_sending() {
    let mut message = Message::new("orders", "body");
    message
        .with_variables([("priority", "high")])
        .with_postpone(30)
        .with_retention(7200);

    assert_eq!(message.topic(), "orders");
    assert_eq!(message.variable("priority"), Some("high"));
    assert_eq!(message.variables().len(), 1);
    assert_eq!(message.postpone(), 30);
    assert_eq!(message.retention(), 7200);
    assert_eq!(message.uuid(), None);
}

#[test]
fn empty_batch_fails_validation_without_a_call() {
    let (client, transport) = in_memory_client();

    let err = client.publish_batch(&[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "Messages array cannot be empty");
    assert_eq!(transport.publish_calls(), 0);
}

#[test]
fn empty_topic_fails_validation_without_a_call() {
    let (client, transport) = in_memory_client();

    let err = client
        .publish_batch(&[Message::new("orders", "ok"), Message::new("", "bad")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.message().starts_with("Message topic is required"));
    assert_eq!(transport.publish_calls(), 0);
}

#[test]
fn failed_status_surfaces_as_publish_error_with_cause() {
    let (client, transport) = in_memory_client();
    transport.fail_next_publish(Status::unauthenticated("invalid token"));

    let err = client
        .publish_batch(&[Message::new("orders", "x")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Publish);
    assert_eq!(err.message(), "Failed to publish messages: invalid token");
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(err.status().unwrap().code(), tonic::Code::Unauthenticated);
}

#[test]
fn no_retry_after_failure() {
    let (client, transport) = in_memory_client();
    transport.fail_next_publish(Status::unavailable("try later"));

    assert!(client.publish_batch(&[Message::new("orders", "x")]).is_err());
    assert_eq!(transport.publish_calls(), 1);
}
