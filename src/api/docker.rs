//! 容器管理 API
//!
//! 包含 /docker/* 端点

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::domain::container::{
    ContainerDetail, ContainerListQuery, ContainerLogsQuery, ContainerLogsResponse,
    ContainerSummary, DockerStats, LifecycleAction, OperationResult, StatusFilter,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 创建容器管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/docker/containers", get(list_containers))
        .route("/docker/containers/:id", get(get_container))
        .route("/docker/containers/:id/logs", get(get_container_logs))
        .route("/docker/containers/:id/start", post(start_container))
        .route("/docker/containers/:id/stop", post(stop_container))
        .route("/docker/containers/:id/restart", post(restart_container))
        .route("/docker/stats", get(get_docker_stats))
}

/// 列出容器
///
/// GET /api/v1/docker/containers?status=running|stopped
async fn list_containers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContainerListQuery>,
) -> ApiResult<Json<Vec<ContainerSummary>>> {
    let filter = query
        .status
        .as_deref()
        .map(str::parse::<StatusFilter>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let containers = state
        .collectors
        .containers
        .list(filter, None)
        .await
        .map_err(|e| ApiError::collect("Failed to list containers", e))?;
    Ok(Json(containers))
}

/// 容器详情
///
/// GET /api/v1/docker/containers/:id
async fn get_container(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContainerDetail>> {
    let detail = state
        .collectors
        .containers
        .detail(&id)
        .await
        .map_err(|e| ApiError::collect("Failed to inspect container", e))?;
    Ok(Json(detail))
}

/// 容器日志
///
/// GET /api/v1/docker/containers/:id/logs?tail=100
async fn get_container_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ContainerLogsQuery>,
) -> ApiResult<Json<ContainerLogsResponse>> {
    let logs = state
        .collectors
        .containers
        .logs(&id, query.tail)
        .await
        .map_err(|e| ApiError::collect("Failed to get container logs", e))?;
    Ok(Json(logs))
}

async fn start_container(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OperationResult>> {
    lifecycle(&state, &id, LifecycleAction::Start).await
}

async fn stop_container(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OperationResult>> {
    lifecycle(&state, &id, LifecycleAction::Stop).await
}

async fn restart_container(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OperationResult>> {
    lifecycle(&state, &id, LifecycleAction::Restart).await
}

async fn lifecycle(
    state: &AppState,
    id: &str,
    action: LifecycleAction,
) -> ApiResult<Json<OperationResult>> {
    let result = state
        .collectors
        .containers
        .lifecycle(id, action)
        .await
        .map_err(|e| ApiError::collect(&format!("Failed to {} container", action.verb()), e))?;
    Ok(Json(result))
}

/// 引擎统计
///
/// GET /api/v1/docker/stats
async fn get_docker_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<DockerStats>> {
    let stats = state
        .collectors
        .containers
        .engine_stats()
        .await
        .map_err(|e| ApiError::collect("Failed to get docker stats", e))?;
    Ok(Json(stats))
}
