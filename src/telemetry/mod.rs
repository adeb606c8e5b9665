//! Telemetry initialization: structured logging via tracing

use crate::config::AdminConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to info-level crate logs
/// with debug-level HTTP traces.
pub fn init(config: &AdminConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "actiongate=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.log_format == "json" {
        // Flatten event fields so `message` is consistently top-level.
        let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        registry.with(fmt_layer).init();
    }
}
