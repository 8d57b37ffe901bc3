//! gRPC transport integration tests.
//!
//! Serves the generated `MqService` from an in-process tonic server and
//! drives it with the blocking client.

use togomq::wire::SubResponse;
use togomq::{Client, Config, ErrorKind, Message, SubscribeOptions};

use crate::support::{eventually, wire, TestBroker};

#[test]
fn publish_round_trip_with_bearer_token() {
    let server = TestBroker::start();
    let client = Client::connect(server.config()).unwrap();

    let mut order = Message::new("orders", "Order with metadata");
    order.with_variables([("priority", "high"), ("customer_id", "12345")]);
    let result = client
        .publish_batch(&[order, Message::new("notifications", "New notification")])
        .unwrap();

    assert_eq!(result.messages_received(), 2);
    let state = server.state();
    assert_eq!(state.published.len(), 1);
    assert_eq!(state.published[0].messages[0].variables["priority"], "high");
    assert_eq!(state.authorization, vec!["Bearer test-token".to_string()]);
    drop(state);

    client.close();
}

#[test]
fn server_rejection_is_publish_error() {
    let server = TestBroker::start();
    let client = Client::connect(server.config()).unwrap();

    let err = client
        .publish_batch(&[Message::new("forbidden", "x")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Publish);
    assert_eq!(
        err.message(),
        "Failed to publish messages: topic forbidden is read-only"
    );
    assert_eq!(err.status().unwrap().code(), tonic::Code::PermissionDenied);
}

#[test]
fn subscription_streams_pushed_batches_then_ends() {
    let server = TestBroker::start();
    {
        let mut state = server.state();
        let mut second = wire("b", "y");
        second.uuid = "u1".into();
        state.batches = vec![
            SubResponse {
                messages: vec![wire("a", "x")],
            },
            SubResponse {
                messages: vec![second],
            },
        ];
    }
    let client = Client::connect(server.config()).unwrap();

    let mut options = SubscribeOptions::new("*");
    options.with_batch(10).with_speed_per_sec(5);
    let messages: Vec<_> = client
        .subscribe(&options)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].topic(), "a");
    assert_eq!(messages[0].uuid(), None);
    assert_eq!(messages[1].uuid(), Some("u1"));

    let state = server.state();
    assert_eq!(state.subscriptions[0].topic, "*");
    assert_eq!(state.subscriptions[0].batch, 10);
    assert_eq!(state.subscriptions[0].speed_per_sec, 5);
    assert_eq!(state.authorization, vec!["Bearer test-token".to_string()]);
}

#[test]
fn stream_error_surfaces_as_subscribe_error() {
    let server = TestBroker::start();
    {
        let mut state = server.state();
        state.batches = vec![SubResponse {
            messages: vec![wire("a", "x")],
        }];
        state.stream_error = Some(tonic::Status::internal("broker restarting"));
    }
    let client = Client::connect(server.config()).unwrap();

    let results: Vec<_> = client
        .subscribe(&SubscribeOptions::new("a"))
        .unwrap()
        .collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Subscribe);
    assert_eq!(err.message(), "Error in subscription: broker restarting");
}

#[test]
fn abandoning_a_live_stream_releases_it_on_the_server() {
    let server = TestBroker::start();
    {
        let mut state = server.state();
        state.batches = vec![SubResponse {
            messages: vec![wire("a", "1"), wire("a", "2")],
        }];
        state.hold_open = true;
    }
    let client = Client::connect(server.config()).unwrap();

    let mut stream = client.subscribe(&SubscribeOptions::new("a")).unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.body_str(), Some("1"));
    drop(stream);

    // Any later call also drives the connection.
    client.publish_batch(&[Message::new("a", "after")]).unwrap();

    assert!(eventually(|| {
        server
            .state()
            .open_senders
            .iter()
            .all(|sender| sender.is_closed())
    }));
}

#[test]
fn closing_the_client_cancels_a_live_subscription() {
    let server = TestBroker::start();
    {
        let mut state = server.state();
        state.batches = vec![
            SubResponse {
                messages: vec![wire("a", "1")],
            },
            SubResponse {
                messages: vec![wire("a", "2")],
            },
        ];
        state.hold_open = true;
    }
    let client = Client::connect(server.config()).unwrap();

    let mut stream = client.subscribe(&SubscribeOptions::new("a")).unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.body_str(), Some("1"));

    client.close();

    let err = stream.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Subscribe);
    assert_eq!(err.message(), "Error in subscription: TogoMQ client closed");
    assert_eq!(err.status().unwrap().code(), tonic::Code::Cancelled);
    assert!(stream.next().is_none());

    assert!(eventually(|| {
        let state = server.state();
        !state.open_senders.is_empty() && state.open_senders.iter().all(|sender| sender.is_closed())
    }));
}

#[tokio::test]
async fn connecting_inside_an_async_runtime_is_connection_error() {
    let config = Config::new("t")
        .with_host("127.0.0.1")
        .with_port(1)
        .with_tls(false)
        .with_log_level(togomq::LogLevel::None);

    let err = Client::connect(config).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.message().contains("async runtime"));
}

#[test]
fn unreachable_broker_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config::new("t")
        .with_host("127.0.0.1")
        .with_port(port)
        .with_tls(false)
        .with_log_level(togomq::LogLevel::None);
    let err = Client::connect(config).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err
        .message()
        .starts_with("Failed to initialize TogoMQ client"));
    assert!(err.has_source());
}

#[test]
fn token_that_is_not_valid_metadata_is_auth_error() {
    let config = Config::new("line\nbreak").with_log_level(togomq::LogLevel::None);
    let err = Client::connect(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Auth);
}
