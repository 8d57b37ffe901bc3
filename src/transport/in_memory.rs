//! In-memory transport for testing and local development.
//!
//! Records every request it receives and replays scripted subscription
//! batches, so client behavior can be exercised without a broker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tonic::Status;

use super::{closed_status, BatchStream, Transport};
use crate::wire::{MqMessage, PubRequest, PubResponse, SubRequest, SubResponse};

/// Scripted in-memory transport.
///
/// Features:
/// - Cloneable handle; clones share the same recorded state
/// - Publishes are acknowledged with the number of messages received
/// - Subscriptions replay the scripted batches, then close cleanly
/// - Open streams are counted so tests can check they get released
/// - Closing releases every open stream and fails later calls
///
/// ## Example
///
/// ```
/// use togomq::transport::{BatchStream, InMemoryTransport, Transport};
/// use togomq::wire::{MqMessage, SubRequest};
///
/// let transport = InMemoryTransport::new();
/// transport.push_batch(vec![MqMessage { topic: "orders".into(), ..Default::default() }]);
///
/// let mut stream = transport.subscribe(SubRequest { topic: "orders".into(), ..Default::default() }).unwrap();
/// assert_eq!(stream.next_batch().unwrap().unwrap().messages.len(), 1);
/// assert!(stream.next_batch().unwrap().is_none());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    published: Vec<PubRequest>,
    subscriptions: Vec<SubRequest>,
    publish_failure: Option<Status>,
    subscribe_failure: Option<Status>,
    script: VecDeque<Result<SubResponse, Status>>,
    open_streams: usize,
    closed: bool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // The state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every publish request received, in call order.
    pub fn published(&self) -> Vec<PubRequest> {
        self.state().published.clone()
    }

    /// Number of publish calls made.
    pub fn publish_calls(&self) -> usize {
        self.state().published.len()
    }

    /// Every subscribe request received, in call order.
    pub fn subscriptions(&self) -> Vec<SubRequest> {
        self.state().subscriptions.clone()
    }

    /// Answer the next publish with `status` instead of an acknowledgment.
    pub fn fail_next_publish(&self, status: Status) {
        self.state().publish_failure = Some(status);
    }

    /// Reject the next subscribe call with `status`.
    pub fn fail_next_subscribe(&self, status: Status) {
        self.state().subscribe_failure = Some(status);
    }

    /// Queue one server-pushed batch for the next subscription.
    pub fn push_batch(&self, messages: Vec<MqMessage>) {
        self.state().script.push_back(Ok(SubResponse { messages }));
    }

    /// Queue a stream failure after the batches pushed so far.
    pub fn push_error(&self, status: Status) {
        self.state().script.push_back(Err(status));
    }

    /// Streams handed out and not yet dropped or cancelled by `close`.
    pub fn open_streams(&self) -> usize {
        self.state().open_streams
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl Transport for InMemoryTransport {
    type Stream = InMemoryBatchStream;

    fn publish(&self, request: PubRequest) -> Result<PubResponse, Status> {
        let mut state = self.state();
        if state.closed {
            return Err(closed_status());
        }
        let messages_received = request.messages.len() as i64;
        state.published.push(request);
        match state.publish_failure.take() {
            Some(status) => Err(status),
            None => Ok(PubResponse { messages_received }),
        }
    }

    fn subscribe(&self, request: SubRequest) -> Result<InMemoryBatchStream, Status> {
        let mut state = self.state();
        if state.closed {
            return Err(closed_status());
        }
        state.subscriptions.push(request);
        if let Some(status) = state.subscribe_failure.take() {
            return Err(status);
        }
        state.open_streams += 1;
        Ok(InMemoryBatchStream {
            script: std::mem::take(&mut state.script),
            state: Arc::clone(&self.state),
        })
    }

    fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.open_streams = 0;
    }
}

/// A subscription served from the script captured when it was opened.
pub struct InMemoryBatchStream {
    script: VecDeque<Result<SubResponse, Status>>,
    state: Arc<Mutex<State>>,
}

impl BatchStream for InMemoryBatchStream {
    fn next_batch(&mut self) -> Result<Option<SubResponse>, Status> {
        if self.lock_state().closed {
            self.script.clear();
            return Err(closed_status());
        }
        self.script.pop_front().transpose()
    }
}

impl InMemoryBatchStream {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for InMemoryBatchStream {
    fn drop(&mut self) {
        let mut state = self.lock_state();
        // close already released every stream
        if !state.closed {
            state.open_streams = state.open_streams.saturating_sub(1);
        }
    }
}
