//! Tracing subscriber setup.
//!
//! Noisy HTTP modules are pinned to `warn` so the pair-level events stay
//! readable. `RUST_LOG` overrides everything.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Library modules that log connection-level detail.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    EnvFilter::new(directives)
}

/// Install the global subscriber, writing to stderr.
///
/// `log_format` is `json` for one JSON object per event, anything else for
/// human-readable lines.
pub(crate) fn init_logging(log_level: &str, log_format: &str) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(%log_level, %log_format, "logging initialized");
}
