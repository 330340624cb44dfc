//! Structured observability hooks for the compile lifecycle.
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use std::fmt::Display;
use std::path::Path;

use tracing::{info, warn};

/// Span tagging every event of one compile request with its `request_id`.
///
/// Attach it to the request future with `tracing::Instrument`.
pub fn compile_span(request_id: &str) -> tracing::Span {
    tracing::info_span!("texforge.compile", request_id = %request_id)
}

/// Emit event: a compile request entered the pipeline.
pub fn emit_compile_started(request_id: &str, source_bytes: usize, has_bibliography: bool) {
    info!(
        event = "compile.started",
        request_id = %request_id,
        source_bytes = source_bytes,
        has_bibliography = has_bibliography,
    );
}

/// Emit event: the lint stage finished with the given outcome kind.
pub fn emit_lint_finished(outcome: &str) {
    info!(event = "lint.finished", outcome = %outcome);
}

/// Emit event: the compile stage finished.
pub fn emit_compile_finished(duration_ms: u64, success: bool) {
    info!(
        event = "compile.finished",
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: a PDF was written to the output store.
pub fn emit_artifact_stored(name: &str, size_bytes: usize) {
    info!(event = "artifact.stored", name = %name, size_bytes = size_bytes);
}

/// Emit event: a PDF was handed out and consumed.
pub fn emit_artifact_retrieved(name: &str, size_bytes: usize) {
    info!(event = "artifact.retrieved", name = %name, size_bytes = size_bytes);
}

/// Emit event: a scratch directory could not be removed (warning level).
pub fn emit_cleanup_failed(path: &Path, error: &dyn Display) {
    warn!(event = "workspace.cleanup_failed", path = %path.display(), error = %error);
}

/// Emit event: a retrieved artifact could not be deleted (warning level).
pub fn emit_artifact_delete_failed(name: &str, error: &dyn Display) {
    warn!(event = "artifact.delete_failed", name = %name, error = %error);
}
