//! Tracing setup for texforge binaries.
//!
//! Log lines go to stderr. Without `RUST_LOG`, texforge crates log at the
//! requested level and everything else (hyper, rmcp, axum) only at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const TEXFORGE_TARGETS: [&str; 2] = ["texforge_core", "texforged"];

/// Install the global subscriber; later calls are no-ops.
///
/// * `json` — emit newline-delimited JSON instead of human-readable lines.
/// * `level` — texforge verbosity when `RUST_LOG` is unset.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(json, level = %level, "tracing initialised");
    }
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(TEXFORGE_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(default_directives(level))
}
