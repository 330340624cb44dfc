//! HTTP server: MCP endpoint, one-shot downloads and health check

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use texforge_core::{run_blocking, CompilePipeline, CompileService, OutputStore};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mcp::TexforgeMcp;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CompileService>,
}

impl AppState {
    pub fn new(service: CompileService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let service = Arc::clone(&state.service);
    let mcp = StreamableHttpService::new(
        move || Ok(TexforgeMcp::new(Arc::clone(&service))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/download/{filename}", get(download_handler))
        .route("/healthz", get(|| async { "ok" }))
        .nest_service("/mcp", mcp)
        .fallback(not_found)
        .with_state(state)
}

/// Serve a stored PDF once, then forget it.
async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let service = Arc::clone(&state.service);
    let name = filename.clone();
    let bytes = run_blocking(move || service.download(&name)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}

async fn not_found() -> Error {
    Error::NotFound
}

fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// Open the output store, bind and serve until ctrl-c.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let store = OutputStore::new(&config.output_dir).with_context(|| {
        format!("failed to open output directory {}", config.output_dir.display())
    })?;
    let service = CompileService::new(
        CompilePipeline::new(config.toolchain()),
        Arc::new(store),
        config.public_url(),
    );
    let app = router(AppState::new(service));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        addr = %addr,
        output_dir = %config.output_dir.display(),
        public_url = %config.public_url(),
        "Starting texforged"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("texforged stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
