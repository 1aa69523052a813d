//! Bounded execution of one external toolchain process.
//!
//! Each stage is a separate child process with piped stdout/stderr, bounded
//! by the fixed wall-clock budget. A child that outlives the budget is
//! forcibly killed and the stage reported as timed out.

use crate::config::STAGE_TIMEOUT;
use crate::types::{PipelineError, Result, Stage};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run one stage command to completion inside `workdir`.
///
/// `stdin` feeds the child's stdin when given; otherwise stdin is empty.
/// On success returns captured stdout verbatim. A non-zero exit maps to
/// [`PipelineError::Tool`] carrying stderr, falling back to the raw process
/// status when stderr is empty.
pub async fn run_stage(
    stage: Stage,
    argv: &[String],
    workdir: &Path,
    stdin: Option<std::fs::File>,
) -> Result<String> {
    run_stage_with_budget(stage, argv, workdir, stdin, STAGE_TIMEOUT).await
}

async fn run_stage_with_budget(
    stage: Stage,
    argv: &[String],
    workdir: &Path,
    stdin: Option<std::fs::File>,
    budget: Duration,
) -> Result<String> {
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => {
            return Err(PipelineError::Tool {
                stage,
                message: "empty command".to_string(),
            })
        }
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(workdir)
        .stdin(match stdin {
            Some(file) => Stdio::from(file),
            None => Stdio::null(),
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("{}: running {:?} in {}", stage, argv, workdir.display());

    let child = command.spawn().map_err(|e| PipelineError::Tool {
        stage,
        message: format!("failed to spawn {}: {}", program, e),
    })?;

    let output = match timeout(budget, child.wait_with_output()).await {
        Ok(waited) => waited.map_err(|e| PipelineError::Tool {
            stage,
            message: format!("failed to wait for {}: {}", program, e),
        })?,
        Err(_) => {
            // Dropping the in-flight wait future reaps the child via
            // kill_on_drop, so a timed-out process is not left running.
            return Err(PipelineError::Timeout {
                stage,
                timeout_secs: budget.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let message = if stderr.is_empty() {
            format!("{} terminated with {}", program, output.status)
        } else {
            stderr
        };
        return Err(PipelineError::Tool { stage, message });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
