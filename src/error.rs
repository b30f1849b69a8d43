//! 统一错误处理
//!
//! - `CollectError`：采集器层的错误分类
//! - `ApiError`：实现 `IntoResponse`，统一输出 `{error, message}` JSON

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::infra::command::CommandError;

/// 采集错误
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("command timed out after {}s", .0.as_secs())]
    CommandTimeout(Duration),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("failed to parse output: {0}")]
    Parse(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("aggregation failed: {0}")]
    Aggregation(String),
}

impl CollectError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<CommandError> for CollectError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Timeout(d) => CollectError::CommandTimeout(d),
            CommandError::Failed { stderr, .. } => CollectError::CommandFailed(stderr),
            CommandError::SpawnFailed(e) => CollectError::CommandFailed(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for CollectError {
    fn from(err: tokio::task::JoinError) -> Self {
        CollectError::Aggregation(err.to_string())
    }
}

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 404 - 资源未找到
    NotFound(String),
    /// 400 - 请求无效
    BadRequest(String),
    /// 500 - 内部错误
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 带上下文的采集错误转换
    ///
    /// NotFound 保持 404，其余一律 500 并在消息前加上下文
    pub fn collect(context: &str, err: CollectError) -> Self {
        match err {
            CollectError::NotFound(resource) => Self::NotFound(resource),
            other => Self::Internal(format!("{}: {}", context, other)),
        }
    }
}

impl From<CollectError> for ApiError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::NotFound(resource) => Self::NotFound(resource),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", resource),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        (status, Json(ErrorResponse::new(error_type, message))).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(r) => write!(f, "Not found: {}", r),
            ApiError::BadRequest(m) => write!(f, "Bad request: {}", m),
            ApiError::Internal(m) => write!(f, "Internal error: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;
