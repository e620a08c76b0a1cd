//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio_util::sync::CancellationToken;

use crate::agents::{AgentDirectory, AgentInfoService, AgentKind};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AgentInfoResponse, HealthResponse, InvalidateResponse, StatsResponse, SummaryResponse,
    SummaryUpdateRequest, ThumbnailRequest, ThumbnailResponse,
};
use crate::thumbnails::{ImageGenerator, ThumbnailService};

/// Application state shared across all handlers.
///
/// The service owns its caches; cloning the state clones handles, not data.
#[derive(Clone)]
pub struct AppState {
    pub agents: AgentInfoService,
    /// `None` when no image backend is configured
    pub thumbnails: Option<ThumbnailService>,
    /// Cancelled on graceful shutdown to abandon pending retries
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(agents: AgentInfoService) -> Self {
        Self {
            agents,
            thumbnails: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Enables POST /thumbnails, retrying with the configured backoff policy.
    pub fn with_thumbnails(
        mut self,
        config: &Config,
        generator: Arc<dyn ImageGenerator>,
    ) -> Result<Self> {
        self.thumbnails = Some(ThumbnailService::new(generator, config.retry_policy())?);
        Ok(self)
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Builds the state from configuration and a directory backend.
    pub fn from_config(config: &Config, directory: Arc<dyn AgentDirectory>) -> Result<Self> {
        let agents = AgentInfoService::new(
            directory,
            config.agent_cache_capacity,
            config.user_cache_capacity,
        )?;
        Ok(Self::new(agents))
    }
}

async fn lookup(state: &AppState, kind: AgentKind, id: String) -> Result<Json<AgentInfoResponse>> {
    let info = state.agents.get_info(kind, &id).await?;
    Ok(Json(AgentInfoResponse::new(id, kind, info)))
}

/// Handler for GET /agents/:id
pub async fn get_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentInfoResponse>> {
    lookup(&state, AgentKind::Agent, id).await
}

/// Handler for GET /users/:id
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentInfoResponse>> {
    lookup(&state, AgentKind::User, id).await
}

/// Handler for PUT /users/:id/summary
///
/// Refreshes the cached summary of a user if one is cached.
pub async fn update_summary_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SummaryUpdateRequest>,
) -> Result<Json<SummaryResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let refreshed = state.agents.update_user_summary(&id, req.summary).await;
    Ok(Json(SummaryResponse { id, refreshed }))
}

async fn invalidate(state: &AppState, kind: AgentKind, id: String) -> Json<InvalidateResponse> {
    let removed = state.agents.invalidate(kind, &id).await;
    Json(InvalidateResponse { id, kind, removed })
}

/// Handler for DELETE /agents/:id/cache
pub async fn invalidate_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<InvalidateResponse> {
    invalidate(&state, AgentKind::Agent, id).await
}

/// Handler for DELETE /users/:id/cache
pub async fn invalidate_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<InvalidateResponse> {
    invalidate(&state, AgentKind::User, id).await
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.agents.stats().await.into())
}

/// Handler for POST /thumbnails
///
/// Blocks until the image is generated, retries are exhausted, or the
/// server starts shutting down.
pub async fn thumbnail_handler(
    State(state): State<AppState>,
    Json(req): Json<ThumbnailRequest>,
) -> Result<Json<ThumbnailResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let service = state.thumbnails.as_ref().ok_or_else(|| {
        AppError::Unavailable("thumbnail generation is not configured".to_string())
    })?;

    let thumbnail = service
        .generate(&req.world_id, &req.description, &state.shutdown)
        .await?;
    Ok(Json(ThumbnailResponse::new(req.world_id, thumbnail)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
