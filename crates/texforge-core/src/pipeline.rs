//! Lint-then-compile pipeline.
//!
//! A run is a chain of fallible steps: open workspace, inject bibliography,
//! lint, compile, close. Lint always yields a [`LintOutcome`] and can never
//! abort the run; compile yields `Result<CompiledArtifact, CompilationError>`
//! and is the only stage that decides success.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;

use crate::bibliography;
use crate::blocking::run_blocking;
use crate::filter::filter;
use crate::obs;
use crate::request::CompileRequest;
use crate::runner::{RunnerError, StageResult, StageRunner};
use crate::stage::{BuiltinStage, StageConfig};
use crate::workspace::Workspace;

/// Label placed in front of lint diagnostics in composed errors.
pub const LINT_LABEL: &str = "ChkTeX Warnings:";

/// Diagnostic recorded when the linter outlives its timeout.
pub const LINT_TIMEOUT: &str = "ChkTeX timeout";

pub const COMPILATION_TIMEOUT: &str = "Compilation timeout";

/// Used when a failed compile printed nothing useful.
pub const UNKNOWN_COMPILATION_ERROR: &str = "Unknown compilation error";

pub const PDF_NOT_GENERATED: &str = "Compilation failed: PDF not generated";

/// External tools and limits used by a [`CompilePipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Linter executable.
    pub linter: String,

    /// Typesetting engine executable.
    pub compiler: String,

    pub lint_timeout_secs: u64,

    pub compile_timeout_secs: u64,

    /// Parent directory for workspaces (system temp dir when `None`).
    pub scratch_root: Option<PathBuf>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            linter: BuiltinStage::Lint.default_program().to_string(),
            compiler: BuiltinStage::Compile.default_program().to_string(),
            lint_timeout_secs: BuiltinStage::Lint.default_timeout_secs(),
            compile_timeout_secs: BuiltinStage::Compile.default_timeout_secs(),
            scratch_root: None,
        }
    }
}

/// Outcome of the best-effort lint stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// The linter ran and printed nothing.
    Clean,

    /// Trimmed linter output.
    Warnings(String),

    /// The linter was killed after its timeout.
    TimedOut,

    /// The linter could not be run at all.
    Unavailable(String),
}

impl LintOutcome {
    /// Interpret a lint stage run. The exit code is ignored: linters exit
    /// non-zero precisely when they have something to report.
    pub fn from_run(run: Result<StageResult, RunnerError>) -> Self {
        match run {
            Ok(result) => {
                let trimmed = result.stdout.trim();
                if trimmed.is_empty() {
                    LintOutcome::Clean
                } else {
                    LintOutcome::Warnings(trimmed.to_string())
                }
            }
            Err(RunnerError::TimedOut { .. }) => LintOutcome::TimedOut,
            Err(e) => LintOutcome::Unavailable(e.to_string()),
        }
    }

    /// Text this outcome contributes to a composed error.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            LintOutcome::Warnings(text) => Some(text),
            LintOutcome::TimedOut => Some(LINT_TIMEOUT),
            LintOutcome::Clean | LintOutcome::Unavailable(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LintOutcome::Clean => "clean",
            LintOutcome::Warnings(_) => "warnings",
            LintOutcome::TimedOut => "timed_out",
            LintOutcome::Unavailable(_) => "unavailable",
        }
    }
}

/// Why the compile stage failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileFailure {
    /// Non-zero exit; `message` holds the filtered diagnostics.
    Exit { exit_code: i32, message: String },

    Timeout,

    /// Exit code zero but no PDF at the expected path.
    MissingPdf,

    /// Anything else (spawn failure, unreadable output).
    Unexpected(String),
}

impl CompileFailure {
    /// Build an [`CompileFailure::Exit`] from a failed compile run.
    pub fn from_exit(result: &StageResult) -> Self {
        CompileFailure::Exit {
            exit_code: result.exit_code,
            message: compose_exit_message(&result.stderr, &result.stdout),
        }
    }
}

/// Filtered stderr followed by filtered stdout, skipping empty segments.
pub fn compose_exit_message(stderr: &str, stdout: &str) -> String {
    let parts: Vec<String> = [stderr, stdout]
        .into_iter()
        .map(filter)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        UNKNOWN_COMPILATION_ERROR.to_string()
    } else {
        parts.join("\n")
    }
}

/// Fatal compile failure plus any lint diagnostics captured before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    pub lint: Option<String>,
    pub failure: CompileFailure,
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lint {
            None => match &self.failure {
                CompileFailure::Exit { message, .. } => write!(f, "Compilation Error:\n{message}"),
                CompileFailure::Timeout => f.write_str(COMPILATION_TIMEOUT),
                CompileFailure::MissingPdf => f.write_str(PDF_NOT_GENERATED),
                CompileFailure::Unexpected(reason) => f.write_str(reason),
            },
            Some(lint) => {
                write!(f, "{LINT_LABEL}\n{lint}\n\n")?;
                match &self.failure {
                    CompileFailure::Exit { message, .. } => {
                        write!(f, "Compilation Error:\n{message}")
                    }
                    CompileFailure::Timeout => f.write_str(COMPILATION_TIMEOUT),
                    CompileFailure::MissingPdf => write!(f, "Error: {PDF_NOT_GENERATED}"),
                    CompileFailure::Unexpected(reason) => write!(f, "Error: {reason}"),
                }
            }
        }
    }
}

impl std::error::Error for CompilationError {}

/// Errors from a full pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to prepare workspace: {0}")]
    Workspace(#[from] io::Error),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

/// PDF bytes produced by a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    bytes: Vec<u8>,
}

impl CompiledArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Runs lint and compile for one request at a time; cheap to share.
#[derive(Debug, Clone, Default)]
pub struct CompilePipeline {
    toolchain: Toolchain,
}

impl CompilePipeline {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Run a request end to end inside a fresh workspace.
    ///
    /// The workspace is closed before returning, whatever the outcome; if the
    /// future is dropped or panics the guard removes it instead. Directory
    /// setup and teardown run on the blocking pool.
    pub async fn run(&self, request: &CompileRequest) -> Result<CompiledArtifact, PipelineError> {
        let workspace = self.prepare(request).await?;
        let result = self.compile(&workspace).await;
        close_workspace(workspace).await;
        Ok(result?)
    }

    /// Open a workspace for `request` and merge its bibliography.
    async fn prepare(&self, request: &CompileRequest) -> io::Result<Workspace> {
        let scratch_root = self.toolchain.scratch_root.clone();
        let source = request.source.clone();
        let bib = request.bibliography().map(str::to_string);
        run_blocking(move || {
            let workspace = Workspace::open(scratch_root.as_deref(), &source)?;
            bibliography::inject(&workspace, &source, bib.as_deref())?;
            Ok(workspace)
        })
        .await
    }

    /// Lint then compile the workspace's main source.
    pub async fn compile(&self, workspace: &Workspace) -> Result<CompiledArtifact, CompilationError> {
        let lint = self.lint(workspace).await;
        self.compile_stage(workspace)
            .await
            .map_err(|failure| CompilationError {
                lint: lint.diagnostics().map(str::to_string),
                failure,
            })
    }

    /// Run the linter against the workspace. Never fails.
    pub async fn lint(&self, workspace: &Workspace) -> LintOutcome {
        let config = StageConfig::from_builtin(
            BuiltinStage::Lint,
            &self.toolchain.linter,
            &workspace.main_source(),
            workspace.path(),
            self.toolchain.lint_timeout_secs,
        );

        let outcome = LintOutcome::from_run(StageRunner::execute_stage(&config, workspace.path()).await);
        if let LintOutcome::Unavailable(reason) = &outcome {
            debug!(reason = %reason, "Lint stage unavailable, continuing without diagnostics");
        }
        obs::emit_lint_finished(outcome.kind());
        outcome
    }

    async fn compile_stage(&self, workspace: &Workspace) -> Result<CompiledArtifact, CompileFailure> {
        let start = Instant::now();
        let config = StageConfig::from_builtin(
            BuiltinStage::Compile,
            &self.toolchain.compiler,
            &workspace.main_source(),
            workspace.path(),
            self.toolchain.compile_timeout_secs,
        );

        let result = match StageRunner::execute_stage(&config, workspace.path()).await {
            Ok(result) => result,
            Err(RunnerError::TimedOut { .. }) => {
                obs::emit_compile_finished(start.elapsed().as_millis() as u64, false);
                return Err(CompileFailure::Timeout);
            }
            Err(e) => return Err(CompileFailure::Unexpected(e.to_string())),
        };

        obs::emit_compile_finished(result.duration_ms, result.passed());
        if !result.passed() {
            return Err(CompileFailure::from_exit(&result));
        }

        let pdf = workspace.main_pdf();
        match tokio::fs::read(&pdf).await {
            Ok(bytes) => Ok(CompiledArtifact::new(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CompileFailure::MissingPdf),
            Err(e) => Err(CompileFailure::Unexpected(format!(
                "failed to read {}: {}",
                pdf.display(),
                e
            ))),
        }
    }
}

async fn close_workspace(workspace: Workspace) {
    let path = workspace.path().to_path_buf();
    let closed = run_blocking(move || {
        workspace.close();
        Ok::<_, io::Error>(())
    })
    .await;
    if let Err(e) = closed {
        obs::emit_cleanup_failed(&path, &e);
    }
}
