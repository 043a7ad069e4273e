//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV_VAR: &str = "IMAGE_EDITOR_LOG";

/// Installs a stderr `fmt` subscriber.
///
/// The filter comes from `IMAGE_EDITOR_LOG` if set, otherwise from `default_level`
/// (usually [`EditorConfig::log_level`](crate::config::EditorConfig::log_level)).
/// Calling this more than once is harmless: only the first call takes effect.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
