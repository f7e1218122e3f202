use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging.
///
/// - `tracing-subscriber::fmt` for structured logging, compact or JSON lines.
/// - `EnvFilter` for dynamic log levels (RUST_LOG).
pub fn init(json: bool) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slashtech_site=debug,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}
