//! Shared wire types and the pipeline error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage a failure is attributed to.
///
/// Stages are assigned structurally by the runner, never inferred from
/// command text. `Unknown` covers failures outside any stage (workspace
/// creation, unexpected internal errors).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generation,
    Compilation,
    Execution,
    Unknown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generation => "generation",
            Stage::Compilation => "compilation",
            Stage::Execution => "execution",
            Stage::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Request body for `POST /compile`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Lex grammar text. Missing and empty are both validation failures.
    #[serde(default)]
    pub source: String,
    /// Optional stdin text for the execute stage.
    #[serde(default)]
    pub input: Option<String>,
}

/// Response body for `POST /compile`.
///
/// Transport status is decoupled from compile status: pipeline failures are
/// HTTP 200 with `success: false`. Only malformed requests get non-200.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl CompileResponse {
    /// Successful run with captured stdout, verbatim.
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            stage: None,
        }
    }

    /// Stage-tagged pipeline failure.
    pub fn failure(stage: Stage, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            stage: Some(stage),
        }
    }

    /// Validation failure; happens before any stage exists, so no tag.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            stage: None,
        }
    }
}

impl From<&PipelineError> for CompileResponse {
    fn from(err: &PipelineError) -> Self {
        Self::failure(err.stage(), err.message())
    }
}

/// Response body for `GET /health`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub platform: String,
    #[serde(rename = "scratchRoot")]
    pub scratch_root: String,
}

/// Errors produced while driving the compile pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A toolchain process could not be spawned or exited non-zero.
    #[error("{stage} failed: {message}")]
    Tool { stage: Stage, message: String },

    /// A toolchain process exceeded the fixed wall-clock budget.
    #[error("{stage} timed out after {timeout_secs}s")]
    Timeout { stage: Stage, timeout_secs: u64 },

    /// Workspace or file I/O failure outside any stage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Stage the failure is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Tool { stage, .. } | Self::Timeout { stage, .. } => *stage,
            Self::Io(_) => Stage::Unknown,
        }
    }

    /// User-facing message carried in the response body: stderr for tool
    /// failures, a timeout note otherwise. Logs use the `Display` form,
    /// which prefixes the stage.
    pub fn message(&self) -> String {
        match self {
            Self::Tool { message, .. } => message.clone(),
            Self::Timeout { timeout_secs, .. } => {
                format!("process timed out after {}s", timeout_secs)
            }
            Self::Io(err) => err.to_string(),
        }
    }
}
