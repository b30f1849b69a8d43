//! Portal Dashboard Agent - 运维仪表盘代理
//!
//! 通过 docker / redis-cli / wp-cli 与 /proc、备份目录采集主机、容器、站点和备份状态，
//! 以 JSON API 形式提供给管理门户

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::env::constants::{SERVICE_NAME, VERSION};
use crate::config::{EnvConfig, SiteRegistry};
use crate::state::{get_shutdown_token, trigger_shutdown, AppState};

/// 默认日志级别（未设置 RUST_LOG 时）
const DEFAULT_LOG_FILTER: &str = "portal_dashboard_agent=info,tower_http=info";

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// 覆盖 PORT 环境变量
    pub port_override: Option<u16>,
}

/// 初始化日志
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // 重复初始化（例如嵌入到其它进程）时忽略
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化并运行代理，直到收到关闭信号
pub async fn init_and_run_agent_with_config(runtime: RuntimeConfig) {
    init_tracing();

    let mut config = EnvConfig::from_env();
    if let Some(port) = runtime.port_override {
        config.port = port;
    }

    let registry = SiteRegistry::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    info!(
        service = SERVICE_NAME,
        version = VERSION,
        addr = %addr,
        sites = registry.len(),
        command_timeout = ?config.command_timeout,
        probe_concurrency = config.probe_concurrency,
        "Starting agent"
    );

    let state = Arc::new(AppState::new(&config, registry));
    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Failed to bind");
            return;
        }
    };

    tokio::spawn(wait_for_signal());

    let shutdown = get_shutdown_token();
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await;

    match result {
        Ok(()) => info!("Agent stopped"),
        Err(e) => error!(error = %e, "Server error"),
    }
}

/// 等待 Ctrl-C 或 SIGTERM，然后触发全局 shutdown
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    trigger_shutdown();
}
