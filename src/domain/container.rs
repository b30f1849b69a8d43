//! 容器相关领域模型

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::format::two_decimals;

/// 容器状态
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Running,
    Exited,
    Created,
    Paused,
    Stopped,
    Unknown,
}

impl ContainerStatus {
    /// 从 `docker ps` 的 Status 列（如 "Up 3 hours"）推断状态
    pub fn from_status_text(text: &str) -> Self {
        if text.contains("Up") {
            Self::Running
        } else if text.contains("Exited") {
            Self::Exited
        } else if text.contains("Created") {
            Self::Created
        } else if text.contains("Paused") {
            Self::Paused
        } else {
            Self::Unknown
        }
    }

    /// 从 `docker inspect` 的 State.Status（如 "running"）映射
    pub fn from_state(state: &str) -> Self {
        match state {
            "running" => Self::Running,
            "exited" => Self::Exited,
            "created" => Self::Created,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// 列表过滤条件
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Running,
    Stopped,
}

impl StatusFilter {
    /// `stopped` 同时匹配 exited 与 stopped
    pub fn matches(&self, status: ContainerStatus) -> bool {
        match self {
            Self::Running => status == ContainerStatus::Running,
            Self::Stopped => matches!(status, ContainerStatus::Exited | ContainerStatus::Stopped),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            other => Err(format!(
                "invalid status filter '{}', expected 'running' or 'stopped'",
                other
            )),
        }
    }
}

/// 实时资源占用
///
/// 未运行或探测失败的容器使用零值占位，不返回 null
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LiveStats {
    #[serde(serialize_with = "two_decimals")]
    pub cpu_percent: f64,
    pub memory_usage: String,
    pub memory_limit: String,
    pub network_io: String,
    pub block_io: String,
}

impl LiveStats {
    pub fn placeholder() -> Self {
        Self {
            cpu_percent: 0.0,
            memory_usage: "0B".to_string(),
            memory_limit: "0B".to_string(),
            network_io: "0B / 0B".to_string(),
            block_io: "0B / 0B".to_string(),
        }
    }

    /// 解析 `docker stats --format {{.CPUPerc}}\t{{.MemUsage}}\t{{.NetIO}}\t{{.BlockIO}}` 的一行
    ///
    /// 缺失的列回落到占位值
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut stats = Self::placeholder();
        let mut parts = line.split('\t');

        if let Some(cpu) = parts.next() {
            stats.cpu_percent = cpu.trim().trim_end_matches('%').parse().unwrap_or(0.0);
        }
        if let Some(mem) = parts.next() {
            let mut mem_parts = mem.split(" / ");
            if let Some(usage) = mem_parts.next().filter(|s| !s.trim().is_empty()) {
                stats.memory_usage = usage.trim().to_string();
            }
            if let Some(limit) = mem_parts.next() {
                stats.memory_limit = limit.trim().to_string();
            }
        }
        if let Some(net) = parts.next().filter(|s| !s.trim().is_empty()) {
            stats.network_io = net.trim().to_string();
        }
        if let Some(block) = parts.next().filter(|s| !s.trim().is_empty()) {
            stats.block_io = block.trim().to_string();
        }

        Some(stats)
    }
}

/// 容器摘要
#[derive(Clone, Debug, Serialize)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub status: ContainerStatus,
    pub image: String,
    pub stats: LiveStats,
}

/// 容器详情
#[derive(Clone, Debug, Serialize)]
pub struct ContainerDetail {
    pub id: String,
    pub name: String,
    pub status: ContainerStatus,
    /// docker 原始状态（如 "restarting"）
    pub state: String,
    pub image: String,
    pub created: String,
    pub ports: Vec<String>,
    pub stats: LiveStats,
}

/// 容器列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ContainerListQuery {
    /// running / stopped
    pub status: Option<String>,
}

/// 容器日志查询参数
#[derive(Debug, Deserialize)]
pub struct ContainerLogsQuery {
    /// 返回最后 N 行，默认 100
    #[serde(default = "default_log_lines")]
    pub tail: usize,
}

fn default_log_lines() -> usize {
    100
}

/// 容器日志响应
#[derive(Debug, Serialize)]
pub struct ContainerLogsResponse {
    pub container: String,
    pub logs: String,
    pub lines: usize,
}

/// 生命周期操作
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
    Restart,
}

impl LifecycleAction {
    /// docker 子命令
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

/// 操作结果
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

/// Docker 引擎统计
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DockerStats {
    pub containers_running: usize,
    pub containers_stopped: usize,
    pub containers_total: usize,
    pub images_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_text() {
        assert_eq!(ContainerStatus::from_status_text("Up 3 hours"), ContainerStatus::Running);
        assert_eq!(
            ContainerStatus::from_status_text("Up 2 minutes (healthy)"),
            ContainerStatus::Running
        );
        assert_eq!(
            ContainerStatus::from_status_text("Exited (0) 2 days ago"),
            ContainerStatus::Exited
        );
        assert_eq!(ContainerStatus::from_status_text("Created"), ContainerStatus::Created);
        assert_eq!(ContainerStatus::from_status_text("Restarting (1)"), ContainerStatus::Unknown);
    }

    #[test]
    fn test_status_from_state() {
        assert_eq!(ContainerStatus::from_state("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from_state("stopped"), ContainerStatus::Stopped);
        assert_eq!(ContainerStatus::from_state("dead"), ContainerStatus::Unknown);
    }

    #[test]
    fn test_stopped_filter() {
        let f = StatusFilter::Stopped;
        assert!(f.matches(ContainerStatus::Exited));
        assert!(f.matches(ContainerStatus::Stopped));
        assert!(!f.matches(ContainerStatus::Running));
        assert!(!f.matches(ContainerStatus::Created));
    }

    #[test]
    fn test_running_filter() {
        let f = StatusFilter::Running;
        assert!(f.matches(ContainerStatus::Running));
        assert!(!f.matches(ContainerStatus::Paused));
        assert!(!f.matches(ContainerStatus::Exited));
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("running".parse::<StatusFilter>(), Ok(StatusFilter::Running));
        assert_eq!("stopped".parse::<StatusFilter>(), Ok(StatusFilter::Stopped));
        assert!("paused".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_live_stats_parse_line() {
        let stats =
            LiveStats::parse_line("1.25%\t120.5MiB / 1.944GiB\t1.2kB / 3.4kB\t0B / 8.19kB").unwrap();
        assert_eq!(stats.cpu_percent, 1.25);
        assert_eq!(stats.memory_usage, "120.5MiB");
        assert_eq!(stats.memory_limit, "1.944GiB");
        assert_eq!(stats.network_io, "1.2kB / 3.4kB");
        assert_eq!(stats.block_io, "0B / 8.19kB");
    }

    #[test]
    fn test_live_stats_partial_line() {
        let stats = LiveStats::parse_line("0.50%").unwrap();
        assert_eq!(stats.cpu_percent, 0.5);
        assert_eq!(stats.memory_usage, "0B");
        assert_eq!(stats.network_io, "0B / 0B");

        assert!(LiveStats::parse_line("  ").is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ContainerStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
