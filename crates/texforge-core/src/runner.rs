//! External-tool stage execution.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use crate::stage::StageConfig;

/// Errors raised while running a stage, before an exit status is available.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("stage {stage} has empty command")]
    EmptyCommand { stage: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {stage} timed out after {timeout_secs} seconds")]
    TimedOut { stage: String, timeout_secs: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a stage execution.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited successfully.
    pub success: bool,
}

impl StageResult {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Runs one stage as a child process.
pub struct StageRunner;

impl StageRunner {
    /// Execute a single stage in `cwd` and return the captured result.
    ///
    /// The child is killed if it outlives `timeout_secs`; a timeout of zero
    /// waits indefinitely.
    pub async fn execute_stage(
        config: &StageConfig,
        cwd: &Path,
    ) -> Result<StageResult, RunnerError> {
        let start = Instant::now();

        let Some((exe, args)) = config.command.split_first() else {
            return Err(RunnerError::EmptyCommand {
                stage: config.name.clone(),
            });
        };

        debug!(stage = %config.name, command = ?config.command, "Spawning stage");

        let child = Command::new(exe)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: exe.clone(),
                source,
            })?;

        let output = if config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| RunnerError::TimedOut {
                stage: config.name.clone(),
                timeout_secs: config.timeout_secs,
            })??
        } else {
            child.wait_with_output().await?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(StageResult {
            stage_name: config.name.clone(),
            exit_code,
            stdout,
            stderr,
            duration_ms,
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, command: &[&str], timeout_secs: u64) -> StageConfig {
        StageConfig {
            name: name.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
            timeout_secs,
        }
    }

    #[test]
    fn test_stage_result_passed() {
        let result = StageResult {
            stage_name: "compile".to_string(),
            exit_code: 0,
            stdout: "".to_string(),
            stderr: "".to_string(),
            duration_ms: 100,
            success: true,
        };
        assert!(result.passed());
    }

    #[test]
    fn test_stage_result_failed() {
        let result = StageResult {
            stage_name: "compile".to_string(),
            exit_code: 1,
            stdout: "".to_string(),
            stderr: "error".to_string(),
            duration_ms: 100,
            success: false,
        };
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let config = stage("echo_test", &["echo", "hello"], 60);

        let result = StageRunner::execute_stage(&config, Path::new("."))
            .await
            .expect("execute failed");
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let config = stage("false_test", &["false"], 60);

        let result = StageRunner::execute_stage(&config, Path::new("."))
            .await
            .expect("execute failed");
        assert!(!result.success);
        assert_ne!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_execute_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let config = stage("pwd", &["pwd"], 60);

        let result = StageRunner::execute_stage(&config, dir.path())
            .await
            .expect("execute failed");
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_execute_empty_command() {
        let config = stage("empty", &[], 60);
        let err = StageRunner::execute_stage(&config, Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::EmptyCommand { .. }));
    }

    #[tokio::test]
    async fn test_execute_missing_program() {
        let config = stage("missing", &["texforge-no-such-binary"], 60);
        let err = StageRunner::execute_stage(&config, Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
        assert!(err.to_string().contains("texforge-no-such-binary"));
    }

    #[tokio::test]
    async fn test_execute_timeout() {
        let config = stage("sleepy", &["sleep", "5"], 1);
        let start = Instant::now();
        let err = StageRunner::execute_stage(&config, Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::TimedOut { timeout_secs: 1, .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
