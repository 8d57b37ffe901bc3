//! gRPC transport backed by tonic.
//!
//! The public API is blocking, so the transport owns a current-thread tokio
//! runtime and drives each call with `block_on`. No worker threads are
//! started; the channel only makes progress while a call is in flight.
//!
//! The runtime, and with it the connection, belongs to the transport alone.
//! Open streams keep a weak handle plus a slot the transport can empty, so
//! closing or dropping the transport ends them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::watch;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status, Streaming};
use tracing::debug;

use super::{closed_status, BatchStream, Transport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::wire::{MqServiceClient, PubRequest, PubResponse, SubRequest, SubResponse};

type AuthedClient = MqServiceClient<InterceptedService<Channel, BearerAuth>>;

type StreamSlot = Arc<Mutex<Option<Streaming<SubResponse>>>>;

/// Attaches `authorization: Bearer <token>` to every call.
#[derive(Clone)]
pub struct BearerAuth {
    header: MetadataValue<Ascii>,
}

impl BearerAuth {
    pub fn new(token: &str) -> Result<Self> {
        let header = format!("Bearer {}", token)
            .parse::<MetadataValue<Ascii>>()
            .map_err(|e| {
                Error::auth("Auth token cannot be sent as call metadata").with_source(e)
            })?;
        Ok(Self { header })
    }
}

impl Interceptor for BearerAuth {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert("authorization", self.header.clone());
        Ok(request)
    }
}

/// Blocking gRPC connection to a TogoMQ broker.
///
/// Dropping the transport has the same effect as [`Transport::close`].
pub struct GrpcTransport {
    runtime: Arc<Runtime>,
    client: AuthedClient,
    closed: watch::Sender<bool>,
    streams: Mutex<Vec<Weak<Mutex<Option<Streaming<SubResponse>>>>>>,
}

impl GrpcTransport {
    /// Establish the channel described by `config`.
    ///
    /// Fails with a `Connection` error when the channel cannot be set up
    /// or when called from inside an async runtime, and with an `Auth`
    /// error when the token is not valid call metadata.
    pub fn connect(config: &Config) -> Result<Self> {
        if Handle::try_current().is_ok() {
            return Err(Error::connection(
                "Failed to initialize TogoMQ client: the blocking client cannot run inside an \
                 async runtime; call it from a plain thread or spawn_blocking",
            ));
        }

        let auth = BearerAuth::new(config.token())?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(connection_error)?;

        let mut endpoint = Endpoint::from_shared(config.endpoint()).map_err(connection_error)?;
        if config.tls() {
            endpoint = endpoint
                .tls_config(
                    ClientTlsConfig::new()
                        .domain_name(config.host())
                        .with_webpki_roots(),
                )
                .map_err(connection_error)?;
        }

        let channel = runtime
            .block_on(endpoint.connect())
            .map_err(connection_error)?;
        debug!(endpoint = %config.endpoint(), "gRPC channel established");

        Ok(Self {
            runtime: Arc::new(runtime),
            client: MqServiceClient::with_interceptor(channel, auth),
            closed: watch::Sender::new(false),
            streams: Mutex::new(Vec::new()),
        })
    }

    fn ensure_open(&self) -> Result<(), Status> {
        if *self.closed.borrow() {
            return Err(closed_status());
        }
        Ok(())
    }

    fn shutdown(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let released: Vec<_> = lock(&self.streams)
            .drain(..)
            .filter_map(|slot| slot.upgrade())
            .filter_map(|slot| lock(&slot).take())
            .collect();
        if !released.is_empty() {
            debug!(streams = released.len(), "Cancelling open subscriptions");
            release_on(&self.runtime, released);
        }
    }
}

fn connection_error(err: impl Into<crate::error::BoxError>) -> Error {
    let err = err.into();
    Error::connection(format!("Failed to initialize TogoMQ client: {}", err)).with_source(err)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drop `value` on `runtime`, giving the connection task a turn to send
/// the stream resets.
fn release_on<T>(runtime: &Runtime, value: T) {
    // block_on panics inside another runtime; there the reset is sent
    // on the next call instead.
    if Handle::try_current().is_ok() {
        let _guard = runtime.enter();
        drop(value);
        return;
    }
    runtime.block_on(async move {
        drop(value);
        tokio::task::yield_now().await;
    });
}

impl Transport for GrpcTransport {
    type Stream = GrpcBatchStream;

    fn publish(&self, request: PubRequest) -> Result<PubResponse, Status> {
        self.ensure_open()?;
        let mut client = self.client.clone();
        self.runtime
            .block_on(client.publish(request))
            .map(tonic::Response::into_inner)
    }

    fn subscribe(&self, request: SubRequest) -> Result<GrpcBatchStream, Status> {
        self.ensure_open()?;
        let mut client = self.client.clone();
        let streaming = self
            .runtime
            .block_on(client.subscribe(request))?
            .into_inner();

        let slot: StreamSlot = Arc::new(Mutex::new(Some(streaming)));
        let mut streams = lock(&self.streams);
        streams.retain(|open| open.strong_count() > 0);
        streams.push(Arc::downgrade(&slot));

        Ok(GrpcBatchStream {
            runtime: Arc::downgrade(&self.runtime),
            slot,
            closed: self.closed.subscribe(),
        })
    }

    fn close(&self) {
        self.shutdown();
    }
}

impl Drop for GrpcTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// An open `Sub` call. Dropping it cancels the call.
pub struct GrpcBatchStream {
    runtime: Weak<Runtime>,
    slot: StreamSlot,
    closed: watch::Receiver<bool>,
}

impl GrpcBatchStream {
    fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.runtime.strong_count() == 0
    }
}

impl BatchStream for GrpcBatchStream {
    fn next_batch(&mut self) -> Result<Option<SubResponse>, Status> {
        let (Some(runtime), Some(mut streaming)) = (self.runtime.upgrade(), lock(&self.slot).take())
        else {
            return if self.is_closed() {
                Err(closed_status())
            } else {
                Ok(None)
            };
        };

        let mut closed = self.closed.clone();
        let batch = runtime.block_on(async {
            tokio::select! {
                biased;
                // A dropped sender means the transport is gone too.
                _ = closed.wait_for(|closed| *closed) => Err(closed_status()),
                batch = streaming.message() => batch,
            }
        });

        if matches!(batch, Ok(Some(_))) {
            let mut slot = lock(&self.slot);
            if !*self.closed.borrow() {
                *slot = Some(streaming);
                return batch;
            }
        }
        release_on(&runtime, streaming);
        batch
    }
}

impl Drop for GrpcBatchStream {
    fn drop(&mut self) {
        let Some(streaming) = lock(&self.slot).take() else {
            return;
        };
        match self.runtime.upgrade() {
            Some(runtime) => release_on(&runtime, streaming),
            None => drop(streaming),
        }
    }
}
