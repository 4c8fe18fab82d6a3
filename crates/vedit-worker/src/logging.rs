//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive applied on top of `RUST_LOG`.
pub const DEFAULT_DIRECTIVE: &str = "vedit=info";

/// `LOG_FORMAT=json` selects JSON output; anything else is ANSI text.
pub fn use_json(log_format: Option<&str>) -> bool {
    log_format
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub fn env_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match DEFAULT_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Install the global subscriber. Colored text for dev, JSON for production.
pub fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").ok();

    if use_json(log_format.as_deref()) {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter())
            .init();
    }
}
