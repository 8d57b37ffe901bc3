//! Blocking Rust client for the TogoMQ message queue.
//!
//! Publish batches of [`Message`]s and consume a flow-controlled stream of
//! messages from one or more topics (wildcards included) over gRPC.
//!
//! ```no_run
//! use togomq::{Client, Config, Message, SubscribeOptions};
//!
//! let client = Client::connect(Config::from_env()?)?;
//!
//! client.publish_batch(&[Message::new("orders", "hello")])?;
//!
//! let mut options = SubscribeOptions::new("orders");
//! options.with_batch(100).with_speed_per_sec(50);
//! for message in client.subscribe(&options)?.take(10) {
//!     println!("{:?}", message?.body_str());
//! }
//! # Ok::<(), togomq::Error>(())
//! ```

mod client;
mod config;
mod error;
mod logging;
mod message;
mod publisher;
mod subscribe_options;
mod subscription;
pub mod transport;
pub mod wire;

pub use client::Client;
pub use config::{Config, LogLevel, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use message::Message;
pub use publisher::{BatchPublisher, PublishResult};
pub use subscribe_options::SubscribeOptions;
pub use subscription::SubscriptionStream;
