//! 容器清单采集
//!
//! 基于 docker CLI：`ps` 列表、`stats` 实时占用、`inspect` 详情、`logs` 与生命周期操作。
//! 运行中容器的 stats 探测是尽力而为的，失败只会让该容器的数据变成占位值。

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::domain::container::{
    ContainerDetail, ContainerLogsResponse, ContainerStatus, ContainerSummary, DockerStats,
    LifecycleAction, LiveStats, OperationResult, StatusFilter,
};
use crate::error::CollectError;
use crate::infra::docker::{classify_failure, DockerCli};

/// `docker ps` 字段分隔符，不会出现在名称、镜像或状态文本中
const FIELD_DELIMITER: &str = "|||";
const PS_FORMAT: &str = "{{.ID}}|||{{.Names}}|||{{.Status}}|||{{.Image}}";
const STATS_FORMAT: &str = "{{.CPUPerc}}\t{{.MemUsage}}\t{{.NetIO}}\t{{.BlockIO}}";
const SHORT_ID_LEN: usize = 12;

/// `docker ps` 的一行
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRow {
    pub id: String,
    pub name: String,
    pub status: ContainerStatus,
    pub image: String,
}

/// 容器清单采集器
#[derive(Clone)]
pub struct ContainerCollector {
    docker: DockerCli,
    concurrency: usize,
}

impl ContainerCollector {
    pub fn new(docker: DockerCli, concurrency: usize) -> Self {
        Self {
            docker,
            concurrency: concurrency.max(1),
        }
    }

    /// 列出容器，运行中的容器附带实时占用
    pub async fn list(
        &self,
        filter: Option<StatusFilter>,
        name_prefix: Option<&str>,
    ) -> Result<Vec<ContainerSummary>, CollectError> {
        let name_arg = name_prefix.map(|p| format!("name={}", p));
        let mut args = vec!["ps", "-a"];
        if let Some(ref name_arg) = name_arg {
            args.extend(["--filter", name_arg.as_str()]);
        }
        args.extend(["--format", PS_FORMAT]);

        let output = self.docker.run(&args).await?;
        let rows: Vec<ContainerRow> = parse_ps_output(&output)
            .into_iter()
            .filter(|row| filter.map_or(true, |f| f.matches(row.status)))
            .collect();

        let summaries = stream::iter(rows)
            .map(|row| async move {
                let stats = if row.status.is_running() {
                    self.live_stats(&row.name).await
                } else {
                    LiveStats::placeholder()
                };
                ContainerSummary {
                    id: row.id,
                    name: row.name,
                    status: row.status,
                    image: row.image,
                    stats,
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(summaries)
    }

    /// 单个容器的实时占用，失败时返回占位值
    pub async fn live_stats(&self, container: &str) -> LiveStats {
        let result = self
            .docker
            .run(&["stats", "--no-stream", "--format", STATS_FORMAT, container])
            .await;

        match result {
            Ok(output) => output
                .lines()
                .next()
                .and_then(LiveStats::parse_line)
                .unwrap_or_else(LiveStats::placeholder),
            Err(e) => {
                debug!(container = %container, error = %e, "Live stats probe failed");
                LiveStats::placeholder()
            }
        }
    }

    /// 容器详情
    pub async fn detail(&self, id: &str) -> Result<ContainerDetail, CollectError> {
        let resource = checked_resource(id)?;
        let output = self
            .docker
            .run(&["inspect", "--type", "container", id])
            .await
            .map_err(|e| classify_failure(e, &resource))?;

        let records: Vec<InspectRecord> = serde_json::from_str(&output)
            .map_err(|e| CollectError::parse(format!("invalid docker inspect output: {}", e)))?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| CollectError::NotFound(resource.clone()))?;

        let status = ContainerStatus::from_state(&record.state.status);
        let name = record.name.trim_start_matches('/').to_string();
        let stats = if status.is_running() {
            self.live_stats(&name).await
        } else {
            LiveStats::placeholder()
        };

        Ok(ContainerDetail {
            id: short_id(&record.id),
            ports: record.network_settings.port_list(),
            name,
            status,
            state: record.state.status,
            image: record.config.image,
            created: record.created,
            stats,
        })
    }

    /// 容器日志
    ///
    /// docker CLI 分别返回 stdout 与 stderr，两者之间的先后顺序已经丢失：
    /// 结果是 stdout 的最后 N 行在前、stderr 的最后 N 行在后，不是按时间交错
    pub async fn logs(&self, id: &str, tail: usize) -> Result<ContainerLogsResponse, CollectError> {
        let resource = checked_resource(id)?;
        let tail = tail.to_string();
        let output = self
            .docker
            .output(&["logs", "--tail", tail.as_str(), id])
            .await
            .map_err(|e| classify_failure(e, &resource))?;

        let logs = [output.stdout.trim_end(), output.stderr.trim_end()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let lines = logs.lines().count();

        Ok(ContainerLogsResponse {
            container: id.to_string(),
            logs,
            lines,
        })
    }

    /// 启动 / 停止 / 重启
    pub async fn lifecycle(
        &self,
        id: &str,
        action: LifecycleAction,
    ) -> Result<OperationResult, CollectError> {
        let resource = checked_resource(id)?;
        self.docker
            .run(&[action.verb(), id])
            .await
            .map_err(|e| classify_failure(e, &resource))?;

        info!(container = %id, action = action.verb(), "Container lifecycle action completed");

        Ok(OperationResult {
            success: true,
            message: format!("Container {} {} successfully", id, action.past_tense()),
            container_id: Some(id.to_string()),
        })
    }

    /// 引擎级统计
    pub async fn engine_stats(&self) -> Result<DockerStats, CollectError> {
        let statuses = self.docker.run(&["ps", "-a", "--format", "{{.Status}}"]).await?;
        let images = self.docker.run(&["images", "-q"]).await?;

        let mut stats = count_statuses(&statuses);
        stats.images_count = images.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(stats)
    }
}

fn container_resource(id: &str) -> String {
    format!("Container '{}'", id)
}

/// 容器 ID / 名称会作为位置参数传给 docker，以 `-` 开头的值会被当成选项解析
///
/// docker 的容器名与 ID 都不能以 `-` 开头，这类值直接视为不存在
fn checked_resource(id: &str) -> Result<String, CollectError> {
    let resource = container_resource(id);
    if id.is_empty() || id.starts_with('-') {
        return Err(CollectError::NotFound(resource));
    }
    Ok(resource)
}

fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// 解析 `docker ps --format {{.ID}}|||{{.Names}}|||{{.Status}}|||{{.Image}}` 输出
///
/// 字段数不对的行直接跳过
pub fn parse_ps_output(output: &str) -> Vec<ContainerRow> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
            match parts.as_slice() {
                [id, name, status_text, image] => Some(ContainerRow {
                    id: short_id(id.trim()),
                    name: name.trim().to_string(),
                    status: ContainerStatus::from_status_text(status_text),
                    image: image.trim().to_string(),
                }),
                _ => {
                    debug!(line = %line, "Skipping malformed docker ps line");
                    None
                }
            }
        })
        .collect()
}

/// 按 Status 列统计运行中 / 已停止 / 总数
pub fn count_statuses(output: &str) -> DockerStats {
    let statuses: Vec<ContainerStatus> = output
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ContainerStatus::from_status_text)
        .collect();

    DockerStats {
        containers_running: statuses.iter().filter(|s| **s == ContainerStatus::Running).count(),
        containers_stopped: statuses.iter().filter(|s| **s == ContainerStatus::Exited).count(),
        containers_total: statuses.len(),
        images_count: 0,
    }
}

// ========== docker inspect 输出 ==========

#[derive(Debug, Deserialize)]
struct InspectRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Created", default)]
    created: String,
    #[serde(rename = "State")]
    state: InspectState,
    #[serde(rename = "Config")]
    config: InspectConfig,
    #[serde(rename = "NetworkSettings", default)]
    network_settings: InspectNetwork,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Status", default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct InspectConfig {
    #[serde(rename = "Image", default)]
    image: String,
}

#[derive(Debug, Default, Deserialize)]
struct InspectNetwork {
    #[serde(rename = "Ports", default)]
    ports: Option<BTreeMap<String, Option<Vec<PortBinding>>>>,
}

#[derive(Debug, Deserialize)]
struct PortBinding {
    #[serde(rename = "HostPort", default)]
    host_port: String,
}

impl InspectNetwork {
    /// `"<host_port>:<container_port>/<proto>"`，未发布的端口不列出
    fn port_list(&self) -> Vec<String> {
        self.ports
            .iter()
            .flatten()
            .flat_map(|(container_port, bindings)| {
                bindings
                    .iter()
                    .flatten()
                    .map(move |b| format!("{}:{}", b.host_port, container_port))
            })
            .collect()
    }
}
