//! Service configuration and fixed pipeline constants.
//!
//! The scratch root and bind address are process-scoped configuration
//! resolved once at startup. Stage timeout and sweep parameters are fixed
//! constants, set conservatively to bound worst-case resource consumption
//! from adversarial or infinite-loop input programs.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Wall-clock budget for each pipeline stage. No retries; exceeding it is a
/// terminal failure for the request.
pub const STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// How often the background sweep scans the scratch root.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Workspaces older than this are removed by the sweep. Far above the
/// pipeline budget, so in-flight requests are never swept in practice.
pub const WORKSPACE_MAX_AGE: Duration = Duration::from_secs(3600);

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Process-scoped service configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Directory per-request workspaces are created under.
    pub scratch_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            scratch_root: env::temp_dir().join("lexbox-scratch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.scratch_root.ends_with("lexbox-scratch"));
    }

    #[test]
    fn test_sweep_age_exceeds_pipeline_budget() {
        // Three sequential stages is the worst case for a live workspace.
        assert!(WORKSPACE_MAX_AGE > 3 * STAGE_TIMEOUT);
    }
}
