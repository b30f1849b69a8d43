//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod backup;
pub mod dashboard;
pub mod docker;
pub mod health;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// 业务路由统一挂在此前缀下
pub const API_PREFIX: &str = "/api/v1";

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Backup
        .merge(backup::router())
        // Dashboard
        .merge(dashboard::router())
        // Docker
        .merge(docker::router());

    Router::new()
        // Health & Status
        .merge(health::router())
        .nest(API_PREFIX, api)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
