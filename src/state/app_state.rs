//! 应用状态

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{EnvConfig, SiteRegistry};
use crate::infra::{CommandExecutor, CommandRunner};
use crate::services::Collectors;

/// 全局 shutdown token，用于优雅关闭
static GLOBAL_SHUTDOWN: std::sync::OnceLock<CancellationToken> = std::sync::OnceLock::new();

/// 获取全局 shutdown token
pub fn get_shutdown_token() -> CancellationToken {
    GLOBAL_SHUTDOWN
        .get_or_init(CancellationToken::new)
        .clone()
}

/// 触发全局 shutdown
pub fn trigger_shutdown() {
    if let Some(token) = GLOBAL_SHUTDOWN.get() {
        token.cancel();
    }
}

/// 应用状态
///
/// 启动后不再修改，以 `Arc` 在 handler 之间共享
pub struct AppState {
    /// 全部采集器
    pub collectors: Collectors,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 使用真实的命令执行器创建
    pub fn new(config: &EnvConfig, registry: SiteRegistry) -> Self {
        let runner = CommandRunner::new(config.command_timeout);
        Self::with_executor(config, registry, Arc::new(runner))
    }

    /// 使用指定的命令执行器创建
    pub fn with_executor(
        config: &EnvConfig,
        registry: SiteRegistry,
        exec: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            collectors: Collectors::new(config, registry, exec),
            started_at: Utc::now(),
        }
    }

    /// 已运行秒数
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
