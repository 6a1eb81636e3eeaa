//! Tracing subscriber setup. Logs go to stderr so stdout stays machine-readable.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "PSI_LOG";

/// Install the global subscriber. Filter comes from `$PSI_LOG`, then `$RUST_LOG`, then
/// `default_level`. A second call is a no-op.
pub fn init_logging(default_level: Level) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // Already set when running under tests or a host application.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
