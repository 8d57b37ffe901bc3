//! Transport - the connection the client publishes and subscribes through.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Client (per application)                 │
//! │  - publish_batch() via BatchPublisher                    │
//! │  - subscribe() via SubscriptionStream                    │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │             Transport + BatchStream Traits                │
//! │  Transport: publish / subscribe / close                  │
//! │  BatchStream: next_batch()                               │
//! └──────────────────────────────────────────────────────────┘
//!          │                                    │
//!          ▼                                    ▼
//! ┌─────────────────────┐            ┌─────────────────────┐
//! │   GrpcTransport     │            │  InMemoryTransport  │
//! │ (tonic, TLS, auth)  │            │ (tests, local dev)  │
//! └─────────────────────┘            └─────────────────────┘
//! ```
//!
//! Calls block the caller. A transport is reused sequentially by one
//! client; it is not required to support simultaneous calls. Once closed,
//! a transport fails every call and its open streams fail their next read.

mod grpc;
mod in_memory;

use tonic::Status;

use crate::wire::{PubRequest, PubResponse, SubRequest, SubResponse};

pub use grpc::{BearerAuth, GrpcBatchStream, GrpcTransport};
pub use in_memory::{InMemoryBatchStream, InMemoryTransport};

/// A connection able to carry the two broker RPCs.
pub trait Transport {
    type Stream: BatchStream;

    /// Issue one publish call carrying the whole batch.
    fn publish(&self, request: PubRequest) -> Result<PubResponse, Status>;

    /// Open a server-streaming subscription.
    fn subscribe(&self, request: SubRequest) -> Result<Self::Stream, Status>;

    /// Release the connection, cancelling every stream still open on it.
    fn close(&self);
}

/// Returned by a closed transport and by streams it cancelled.
pub(crate) fn closed_status() -> Status {
    Status::cancelled("TogoMQ client closed")
}

/// The server side of an open subscription, read one pushed batch at a time.
///
/// Dropping the stream releases it.
pub trait BatchStream {
    /// Block until the next batch arrives. `Ok(None)` means the server
    /// closed the stream.
    fn next_batch(&mut self) -> Result<Option<SubResponse>, Status>;
}
