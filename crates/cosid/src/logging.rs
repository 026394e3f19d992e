//! Tracing subscriber setup

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Human,
    /// One JSON object per line, for log collectors
    Json,
}

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,h2=warn,tower=warn";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(false)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(?format, "Tracing initialized");
}
