//! Client configuration.
//!
//! `Config` is immutable: every `with_*` setter returns a new value and
//! leaves the receiver untouched. This differs from [`Message`](crate::Message)
//! and [`SubscribeOptions`](crate::SubscribeOptions), whose setters mutate in place.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "q.togomq.io";
pub const DEFAULT_PORT: u16 = 5123;

/// Client log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    None,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "none",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Invalid log level '{}'. Must be one of: debug, info, warn, error, none",
                    s
                ))
            })
    }
}

/// Connection settings for a [`Client`](crate::Client).
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    host: String,
    port: u16,
    token: String,
    log_level: LogLevel,
    tls: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("tls", &self.tls)
            .finish()
    }
}

impl Config {
    /// Create a configuration with the default host, port and log level.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: token.into(),
            log_level: LogLevel::default(),
            tls: true,
        }
    }

    pub fn with_host(&self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self.clone()
        }
    }

    pub fn with_port(&self, port: u16) -> Self {
        Self {
            port,
            ..self.clone()
        }
    }

    pub fn with_log_level(&self, log_level: LogLevel) -> Self {
        Self {
            log_level,
            ..self.clone()
        }
    }

    /// String-typed variant of [`with_log_level`](Self::with_log_level).
    pub fn try_with_log_level(&self, log_level: &str) -> Result<Self> {
        Ok(self.with_log_level(log_level.parse()?))
    }

    /// Toggle TLS. Plaintext is only meant for local brokers and tests.
    pub fn with_tls(&self, tls: bool) -> Self {
        Self {
            tls,
            ..self.clone()
        }
    }

    /// Load configuration from `TOGOMQ_*` environment variables.
    ///
    /// `TOGOMQ_TOKEN` is required; `TOGOMQ_HOST`, `TOGOMQ_PORT`,
    /// `TOGOMQ_LOG_LEVEL` and `TOGOMQ_TLS` fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let source = ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("TOGOMQ").try_parsing(true))
            .build()?;
        let partial: PartialConfig = source.try_deserialize()?;

        let token = partial
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::configuration("TOGOMQ_TOKEN is required"))?;

        let mut config = Config::new(token);
        if let Some(host) = partial.host {
            config = config.with_host(host);
        }
        if let Some(port) = partial.port {
            config = config.with_port(port);
        }
        if let Some(level) = partial.log_level {
            config = config.try_with_log_level(&level)?;
        }
        if let Some(tls) = partial.tls {
            config = config.with_tls(tls);
        }
        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn tls(&self) -> bool {
        self.tls
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Endpoint URI including the scheme implied by the TLS setting.
    pub fn endpoint(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.address())
    }
}

/// Environment values before defaults are applied.
#[derive(Debug, Deserialize)]
struct PartialConfig {
    host: Option<String>,
    port: Option<u16>,
    token: Option<String>,
    log_level: Option<String>,
    tls: Option<bool>,
}
