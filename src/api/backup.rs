//! 备份 API
//!
//! 包含 /backup/* 端点

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::domain::backup::{BackupSchedule, BackupStats, BlogBackups, MailserverBackups};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 创建备份路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/backup/mailserver/list", get(list_mailserver_backups))
        .route("/backup/blog/list", get(list_blog_backups))
        .route("/backup/stats", get(get_backup_stats))
        .route("/backup/schedule", get(get_backup_schedule))
}

/// 邮件服务器备份列表
///
/// GET /api/v1/backup/mailserver/list
async fn list_mailserver_backups(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MailserverBackups>> {
    let backups = state
        .collectors
        .backup
        .mailserver()
        .await
        .map_err(|e| ApiError::collect("Failed to list mailserver backups", e))?;
    Ok(Json(backups))
}

/// 博客备份列表
///
/// GET /api/v1/backup/blog/list
async fn list_blog_backups(State(state): State<Arc<AppState>>) -> ApiResult<Json<BlogBackups>> {
    let backups = state
        .collectors
        .backup
        .blog()
        .await
        .map_err(|e| ApiError::collect("Failed to list blog backups", e))?;
    Ok(Json(backups))
}

/// 备份统计
///
/// GET /api/v1/backup/stats
async fn get_backup_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<BackupStats>> {
    let stats = state
        .collectors
        .backup
        .stats()
        .await
        .map_err(|e| ApiError::collect("Failed to get backup stats", e))?;
    Ok(Json(stats))
}

/// 备份计划
///
/// GET /api/v1/backup/schedule
async fn get_backup_schedule(State(state): State<Arc<AppState>>) -> Json<BackupSchedule> {
    Json(state.collectors.backup.schedule())
}
