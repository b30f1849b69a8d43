//! 仪表盘 API
//!
//! 包含 /dashboard/* 端点。overview 按分区降级，其余端点任一失败即返回错误

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::domain::{BackupStats, CacheStats, ContainerSummary, DashboardOverview, HostMetrics, SiteStatus};
use crate::error::{ApiError, ApiResult};
use crate::services::overview::overview;
use crate::state::AppState;

/// 创建仪表盘路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/overview", get(get_overview))
        .route("/dashboard/system", get(get_system))
        .route("/dashboard/containers", get(get_containers))
        .route("/dashboard/wordpress", get(get_wordpress_sites))
        .route("/dashboard/redis", get(get_redis))
        .route("/dashboard/backup", get(get_backup))
}

/// GET /api/v1/dashboard/overview
async fn get_overview(State(state): State<Arc<AppState>>) -> Json<DashboardOverview> {
    Json(overview(&state.collectors).await)
}

/// GET /api/v1/dashboard/system
async fn get_system(State(state): State<Arc<AppState>>) -> ApiResult<Json<HostMetrics>> {
    let metrics = state
        .collectors
        .host
        .collect()
        .await
        .map_err(|e| ApiError::collect("Failed to get system stats", e))?;
    Ok(Json(metrics))
}

/// GET /api/v1/dashboard/containers
async fn get_containers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ContainerSummary>>> {
    let containers = state
        .collectors
        .dashboard_containers()
        .await
        .map_err(|e| ApiError::collect("Failed to get container stats", e))?;
    Ok(Json(containers))
}

/// GET /api/v1/dashboard/wordpress
async fn get_wordpress_sites(State(state): State<Arc<AppState>>) -> Json<Vec<SiteStatus>> {
    Json(state.collectors.sites.collect().await)
}

/// GET /api/v1/dashboard/redis
async fn get_redis(State(state): State<Arc<AppState>>) -> ApiResult<Json<CacheStats>> {
    let stats = state
        .collectors
        .cache
        .collect()
        .await
        .map_err(|e| ApiError::collect("Failed to get Redis stats", e))?;
    Ok(Json(stats))
}

/// GET /api/v1/dashboard/backup
async fn get_backup(State(state): State<Arc<AppState>>) -> ApiResult<Json<BackupStats>> {
    let stats = state
        .collectors
        .backup
        .stats()
        .await
        .map_err(|e| ApiError::collect("Failed to get backup stats", e))?;
    Ok(Json(stats))
}
