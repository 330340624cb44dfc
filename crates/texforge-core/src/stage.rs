//! Pipeline stage definitions and configuration.

use std::path::Path;

/// Builtin pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinStage {
    /// chktex -q <main.tex>
    Lint,

    /// tectonic <main.tex> --outdir <workspace>
    Compile,
}

impl BuiltinStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStage::Lint => "lint",
            BuiltinStage::Compile => "compile",
        }
    }

    /// Executable used when none is configured.
    pub fn default_program(&self) -> &'static str {
        match self {
            BuiltinStage::Lint => "chktex",
            BuiltinStage::Compile => "tectonic",
        }
    }

    /// Timeout used when none is configured.
    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            BuiltinStage::Lint => 10,
            BuiltinStage::Compile => 60,
        }
    }

    /// Build the stage's command line for `program` against `source`.
    ///
    /// `outdir` is only used by the compile stage.
    pub fn command(&self, program: &str, source: &Path, outdir: &Path) -> Vec<String> {
        let source = source.to_string_lossy().to_string();
        match self {
            BuiltinStage::Lint => vec![program.to_string(), "-q".to_string(), source],
            BuiltinStage::Compile => vec![
                program.to_string(),
                source,
                "--outdir".to_string(),
                outdir.to_string_lossy().to_string(),
            ],
        }
    }
}

/// Configuration for a single external-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// Human-readable stage name.
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Timeout in seconds.
    pub timeout_secs: u64,
}

impl StageConfig {
    /// Create a stage configuration from a builtin stage.
    pub fn from_builtin(
        stage: BuiltinStage,
        program: &str,
        source: &Path,
        outdir: &Path,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: stage.name().to_string(),
            command: stage.command(program, source, outdir),
            timeout_secs,
        }
    }
}
