//! Flattening server-pushed batches into one pull-based message sequence.

use std::iter::FusedIterator;
use std::vec;

use tracing::{debug, error, info, Dispatch};

use crate::error::{Error, Result};
use crate::logging;
use crate::message::Message;
use crate::subscribe_options::SubscribeOptions;
use crate::transport::{BatchStream, Transport};
use crate::wire::MqMessage;

/// A live subscription, consumed as an iterator of messages.
///
/// Each call to `next` yields the next message in server order, blocking
/// while the server has nothing buffered. The iterator ends with `None`
/// when the server closes the stream, or after yielding a single
/// `Subscribe` error when reading fails. Dropping it (for example by
/// breaking out of a `for` loop) releases the underlying stream.
///
/// ```no_run
/// use togomq::{Client, Config, SubscribeOptions};
///
/// let client = Client::connect(Config::new("token"))?;
/// for message in client.subscribe(&SubscribeOptions::new("orders.*"))? {
///     let message = message?;
///     println!("{} {:?}", message.topic(), message.body_str());
///     break;
/// }
/// # Ok::<(), togomq::Error>(())
/// ```
pub struct SubscriptionStream<S> {
    inner: Option<S>,
    pending: vec::IntoIter<MqMessage>,
    dispatch: Dispatch,
}

impl<S: BatchStream> SubscriptionStream<S> {
    /// Validate `options` and open the stream on `transport`.
    pub fn open<T>(transport: &T, options: &SubscribeOptions, dispatch: Dispatch) -> Result<Self>
    where
        T: Transport<Stream = S>,
    {
        if options.topic().is_empty() {
            return Err(Error::validation("Topic is required for subscription"));
        }

        logging::scoped(&dispatch, || -> Result<S> {
            info!(
                topic = options.topic(),
                batch = options.batch(),
                speed_per_sec = options.speed_per_sec(),
                "Starting subscription"
            );
            let stream = transport.subscribe(options.to_wire()).map_err(|status| {
                error!(error = %status, "Subscription error");
                Error::from_subscribe_status(status)
            })?;
            debug!("Subscription stream started");
            Ok(stream)
        })
        .map(|stream| Self {
            inner: Some(stream),
            pending: Vec::new().into_iter(),
            dispatch,
        })
    }

    /// Whether the underlying stream is still open.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Stop consuming and release the underlying stream.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.inner.take();
        self.pending = Vec::new().into_iter();
    }

    fn pull(&mut self) -> Option<Result<Message>> {
        loop {
            if let Some(wire) = self.pending.next() {
                let message = Message::from(wire);
                debug!(topic = message.topic(), uuid = message.uuid(), "Received message");
                return Some(Ok(message));
            }

            let stream = self.inner.as_mut()?;
            match stream.next_batch() {
                Ok(Some(batch)) => self.pending = batch.messages.into_iter(),
                Ok(None) => {
                    info!("Subscription stream ended");
                    self.release();
                    return None;
                }
                Err(status) => {
                    error!(error = %status, "Subscription error");
                    self.release();
                    return Some(Err(Error::from_subscribe_status(status)));
                }
            }
        }
    }
}

impl<S: BatchStream> Iterator for SubscriptionStream<S> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        let dispatch = self.dispatch.clone();
        logging::scoped(&dispatch, || self.pull())
    }
}

impl<S: BatchStream> FusedIterator for SubscriptionStream<S> {}
