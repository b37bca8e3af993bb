//! Diagnostics go to stderr so stdout carries nothing but the generated
//! arguments.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "GOSTWRITER_LOG";

/// Install the stderr subscriber. Level comes from `GOSTWRITER_LOG`
/// (any `EnvFilter` directive), defaulting to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
