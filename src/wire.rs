//! Wire types for the `mq.v1.MqService` gRPC service.
//!
//! Messages are prost structs (standard protobuf wire format, no `.proto`
//! file). The client and server stubs are generated by `build.rs`.
//!
//! ## RPCs
//!
//! - `Pub` — publish a batch. Input = `PubRequest`, output = `PubResponse`.
//! - `Sub` — server-streaming subscription. Input = `SubRequest`, output =
//!   a stream of `SubResponse`, each holding one pushed batch.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message)]
pub struct MqMessage {
    #[prost(string, tag = "1")]
    pub topic: String,
    #[prost(bytes = "vec", tag = "2")]
    pub body: Vec<u8>,
    #[prost(map = "string, string", tag = "3")]
    pub variables: HashMap<String, String>,
    #[prost(int64, tag = "4")]
    pub postpone: i64,
    #[prost(int64, tag = "5")]
    pub retention: i64,
    #[prost(string, tag = "6")]
    pub uuid: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PubRequest {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<MqMessage>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PubResponse {
    #[prost(int64, tag = "1")]
    pub messages_received: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SubRequest {
    #[prost(string, tag = "1")]
    pub topic: String,
    #[prost(int64, tag = "2")]
    pub batch: i64,
    #[prost(int64, tag = "3")]
    pub speed_per_sec: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SubResponse {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<MqMessage>,
}

// ---------------------------------------------------------------------------
// Generated service client + server
// ---------------------------------------------------------------------------

include!(concat!(env!("OUT_DIR"), "/mq.v1.MqService.rs"));

pub use mq_service_client::MqServiceClient;
pub use mq_service_server::{MqService, MqServiceServer};
