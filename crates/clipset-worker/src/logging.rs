//! Tracing setup shared by the pipeline binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing: colored output for dev, JSON when `LOG_FORMAT=json`.
pub fn init() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("clipset_models=info".parse().unwrap())
        .add_directive("clipset_media=info".parse().unwrap())
        .add_directive("clipset_worker=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
