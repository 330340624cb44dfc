//! texforge core - LaTeX to PDF compilation
//!
//! Provides the compile pipeline behind the `compile_latex` tool:
//! - Scratch workspaces that never outlive their request
//! - Bibliography injection
//! - Best-effort lint followed by an authoritative compile
//! - A one-shot output store for the resulting PDFs

pub mod bibliography;
pub mod blocking;
pub mod filter;
pub mod obs;
pub mod pipeline;
pub mod request;
pub mod runner;
pub mod service;
pub mod stage;
pub mod store;
pub mod telemetry;
pub mod workspace;

// Re-export key types
pub use blocking::run_blocking;
pub use filter::filter;
pub use pipeline::{
    CompilationError, CompileFailure, CompilePipeline, CompiledArtifact, LintOutcome,
    PipelineError, Toolchain,
};
pub use request::CompileRequest;
pub use runner::{RunnerError, StageResult, StageRunner};
pub use service::{CompileLatexArgs, CompileService};
pub use stage::{BuiltinStage, StageConfig};
pub use store::{OutputStore, StoreError, StoreResult, StoredFile};
pub use telemetry::init_tracing;
pub use workspace::Workspace;
