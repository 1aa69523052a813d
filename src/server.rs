//! HTTP endpoint layer and background sweep.
//!
//! `POST /compile` validates the request, allocates a workspace, drives the
//! pipeline, and always answers HTTP 200 with a structured body once a
//! request is accepted; only malformed requests get non-200. `GET /health`
//! reports liveness and environment diagnostics with no side effects.

use crate::config::{ServerConfig, MAX_BODY_BYTES, SWEEP_INTERVAL, WORKSPACE_MAX_AGE};
use crate::pipeline::{self, toolchain::PlatformSpec};
use crate::types::{CompileRequest, CompileResponse, HealthResponse, Result};
use crate::workspace::WorkspaceManager;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub workspaces: WorkspaceManager,
    pub platform: PlatformSpec,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/compile", post(compile))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn compile(
    State(state): State<AppState>,
    Json(request): Json<CompileRequest>,
) -> (StatusCode, Json<CompileResponse>) {
    if request.source.is_empty() {
        // Rejected before any workspace exists.
        return (
            StatusCode::BAD_REQUEST,
            Json(CompileResponse::invalid("no Lex source provided")),
        );
    }

    (StatusCode::OK, Json(run_request(&state, &request).await))
}

/// Run one accepted request to a structured outcome. Every failure past
/// validation lands here as a `success: false` body; nothing propagates to
/// the transport layer.
async fn run_request(state: &AppState, request: &CompileRequest) -> CompileResponse {
    let workspace = match state.workspaces.create() {
        Ok(workspace) => workspace,
        Err(e) => {
            log::error!("workspace creation failed: {}", e);
            return CompileResponse::from(&e);
        }
    };

    log::info!(
        "workspace {} created ({} bytes of source)",
        workspace.id(),
        request.source.len()
    );

    let result = pipeline::run(&workspace, &state.platform, request).await;
    workspace.cleanup();

    match result {
        Ok(output) => {
            log::info!("workspace {} finished ok", workspace.id());
            CompileResponse::success(output)
        }
        Err(e) => {
            log::info!("workspace {} failed: {}", workspace.id(), e);
            CompileResponse::from(&e)
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        platform: std::env::consts::OS.to_string(),
        scratch_root: state.workspaces.scratch_root().display().to_string(),
    })
}

/// Spawn the periodic scratch-root sweep. The first tick fires immediately
/// and clears leftovers from a previous process.
pub fn spawn_sweeper(manager: WorkspaceManager) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let target = manager.clone();
            match tokio::task::spawn_blocking(move || target.sweep(WORKSPACE_MAX_AGE)).await {
                Ok(Ok(0)) => {}
                Ok(Ok(removed)) => log::info!("sweep removed {} stale workspaces", removed),
                Ok(Err(e)) => log::warn!("sweep failed: {}", e),
                Err(e) => log::warn!("sweep task panicked: {}", e),
            }
        }
    })
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let workspaces = WorkspaceManager::new(config.scratch_root.clone())?;
    let platform = PlatformSpec::host();

    spawn_sweeper(workspaces.clone());

    let state = AppState {
        workspaces,
        platform,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("lexbox listening on http://{}", listener.local_addr()?);
    log::info!("scratch root: {}", config.scratch_root.display());
    log::info!(
        "platform: {}, link flags: {:?}",
        std::env::consts::OS,
        platform.link_flags
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    fn test_state(tag: &str) -> AppState {
        let root = std::env::temp_dir().join(format!("lexbox-srv-{}-{}", tag, Uuid::new_v4()));
        AppState {
            workspaces: WorkspaceManager::new(root).unwrap(),
            platform: PlatformSpec::host(),
        }
    }

    fn entry_count(state: &AppState) -> usize {
        fs::read_dir(state.workspaces.scratch_root()).unwrap().count()
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected_without_a_workspace() {
        let state = test_state("empty");
        let before = entry_count(&state);

        let (status, Json(body)) = compile(
            State(state.clone()),
            Json(CompileRequest {
                source: String::new(),
                input: None,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.is_some());
        assert!(body.stage.is_none());
        assert_eq!(entry_count(&state), before);

        let _ = fs::remove_dir_all(state.workspaces.scratch_root());
    }

    #[tokio::test]
    async fn test_accepted_request_always_answers_200() {
        // Whatever the toolchain does on this host, an accepted request is
        // transport-level success with a structured body, and its workspace
        // is gone afterwards.
        let state = test_state("accepted");

        let (status, Json(body)) = compile(
            State(state.clone()),
            Json(CompileRequest {
                source: "%%\n%%\n".to_string(),
                input: None,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        if !body.success {
            assert!(body.stage.is_some());
            assert!(body.error.is_some());
        }
        assert_eq!(entry_count(&state), 0);

        let _ = fs::remove_dir_all(state.workspaces.scratch_root());
    }

    #[tokio::test]
    async fn test_health_reports_environment() {
        let state = test_state("health");
        let Json(body) = health(State(state.clone())).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.platform, std::env::consts::OS);
        assert_eq!(
            body.scratch_root,
            state.workspaces.scratch_root().display().to_string()
        );

        let _ = fs::remove_dir_all(state.workspaces.scratch_root());
    }
}
