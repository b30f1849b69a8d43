//! WordPress 站点状态采集
//!
//! 对注册表中的每个站点在 WordPress 容器内执行 `wp redis status`，
//! 单个站点探测失败只影响该站点。

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::config::{SiteRegistry, WordPressConfig};
use crate::domain::site::{SiteEntry, SiteState, SiteStatus};
use crate::infra::docker::DockerCli;

/// `wp redis status` 输出中的关键字段
#[derive(Debug, Default, PartialEq)]
pub struct RedisStatusReport {
    pub connected: bool,
    pub hit_rate: Option<f64>,
}

/// 站点状态采集器
#[derive(Clone)]
pub struct SiteCollector {
    docker: DockerCli,
    config: WordPressConfig,
    registry: SiteRegistry,
    concurrency: usize,
}

impl SiteCollector {
    pub fn new(
        docker: DockerCli,
        config: WordPressConfig,
        registry: SiteRegistry,
        concurrency: usize,
    ) -> Self {
        Self {
            docker,
            config,
            registry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// 探测全部站点，结果顺序与注册表一致
    pub async fn collect(&self) -> Vec<SiteStatus> {
        stream::iter(self.registry.sites().iter().cloned())
            .map(|site| async move { self.probe(&site).await })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// 探测单个站点
    pub async fn probe(&self, site: &SiteEntry) -> SiteStatus {
        let path_arg = format!(
            "--path={}/{}",
            self.config.sites_root.trim_end_matches('/'),
            site.site_id
        );
        let result = self
            .docker
            .run(&[
                "exec",
                self.config.container.as_str(),
                "wp",
                "redis",
                "status",
                path_arg.as_str(),
                "--allow-root",
            ])
            .await;

        match result {
            Ok(output) => {
                let report = parse_redis_status(&output);
                SiteStatus {
                    site_name: site.site_id.clone(),
                    url: site.url.clone(),
                    status: SiteState::Running,
                    redis_connected: report.connected,
                    cache_hit_rate: report.hit_rate.unwrap_or(0.0),
                }
            }
            Err(e) => {
                warn!(site = %site.site_id, error = %e, "Site probe failed");
                SiteStatus::unknown(site)
            }
        }
    }
}

/// 解析 `wp redis status` 输出
///
/// `Status: Connected` 表示对象缓存已连接；`Hit rate: NN%` 行可选
pub fn parse_redis_status(output: &str) -> RedisStatusReport {
    let mut report = RedisStatusReport::default();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "status" => report.connected = value.eq_ignore_ascii_case("connected"),
            "hit rate" => {
                report.hit_rate = value.trim_end_matches('%').trim().parse().ok();
            }
            _ => {}
        }
    }

    report
}
