//! Per-client log output.
//!
//! Each client builds its own `tracing` dispatcher from its [`LogLevel`]
//! and runs its operations under it, so two clients with different levels
//! can coexist without touching the global subscriber. Only this crate's
//! events are printed; the transport libraries running inside a call keep
//! their own logging.

use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::LogLevel;

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::None => LevelFilter::OFF,
        }
    }
}

/// Build the dispatcher a client logs through.
pub fn dispatch(level: LogLevel) -> Dispatch {
    if level == LogLevel::None {
        return Dispatch::none();
    }

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(Targets::new().with_target("togomq", LevelFilter::from(level)));
    Dispatch::new(subscriber)
}

/// Run `f` with `dispatch` as the current default subscriber.
pub(crate) fn scoped<T>(dispatch: &Dispatch, f: impl FnOnce() -> T) -> T {
    tracing::dispatcher::with_default(dispatch, f)
}
