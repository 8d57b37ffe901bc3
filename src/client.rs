//! The application-facing client.

use tracing::{debug, info, Dispatch};

use crate::config::Config;
use crate::error::Result;
use crate::logging;
use crate::message::Message;
use crate::publisher::{BatchPublisher, PublishResult};
use crate::subscribe_options::SubscribeOptions;
use crate::subscription::SubscriptionStream;
use crate::transport::{GrpcTransport, Transport};

/// A TogoMQ client: its configuration plus the connection it owns.
///
/// Calls block the calling thread. One client serves calls one at a time;
/// callers needing concurrency should serialize access or create
/// independent clients.
///
/// # Panics
///
/// The gRPC client drives its own runtime, so it must not be used from
/// inside an async context. [`Client::connect`] reports that case as a
/// `Connection` error; publishing, reading a subscription or dropping the
/// client there panics. Async applications should call it through
/// `tokio::task::spawn_blocking`.
///
/// ## Example
///
/// ```no_run
/// use togomq::{Client, Config, Message};
///
/// let client = Client::connect(Config::new("token"))?;
///
/// let mut order = Message::new("orders", r#"{"id":"ORD-1"}"#);
/// order.with_variable("priority", "high").with_retention(3600);
///
/// let result = client.publish_batch(&[order])?;
/// println!("published {}", result.messages_received());
/// client.close();
/// # Ok::<(), togomq::Error>(())
/// ```
pub struct Client<T: Transport = GrpcTransport> {
    config: Config,
    transport: T,
    dispatch: Dispatch,
}

impl Client<GrpcTransport> {
    /// Connect to the broker described by `config`.
    pub fn connect(config: Config) -> Result<Self> {
        let dispatch = logging::dispatch(config.log_level());
        let transport = logging::scoped(&dispatch, || -> Result<GrpcTransport> {
            info!(
                host = config.host(),
                port = config.port(),
                "Initializing TogoMQ client"
            );
            let transport = GrpcTransport::connect(&config)?;
            debug!("TogoMQ client initialized successfully");
            Ok(transport)
        })?;

        Ok(Self {
            config,
            transport,
            dispatch,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over an already established transport.
    pub fn with_transport(config: Config, transport: T) -> Self {
        let dispatch = logging::dispatch(config.log_level());
        Self {
            config,
            transport,
            dispatch,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Publish a batch of messages in a single call.
    pub fn publish_batch(&self, messages: &[Message]) -> Result<PublishResult> {
        logging::scoped(&self.dispatch, || {
            BatchPublisher::new(&self.transport).publish(messages)
        })
    }

    /// Subscribe to a topic or wildcard pattern.
    ///
    /// The options are validated before any stream is opened. Closing the
    /// client ends the returned stream: its next read yields a `Subscribe`
    /// error.
    pub fn subscribe(
        &self,
        options: &SubscribeOptions,
    ) -> Result<SubscriptionStream<T::Stream>> {
        SubscriptionStream::open(&self.transport, options, self.dispatch.clone())
    }

    /// Release the connection and cancel its open subscriptions. The client
    /// cannot be used afterwards.
    pub fn close(self) {
        logging::scoped(&self.dispatch, || {
            debug!("Closing TogoMQ client");
            self.transport.close();
        });
    }
}
