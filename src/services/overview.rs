//! 仪表盘总览
//!
//! 并发运行全部采集器。任一分区失败时该分区为 null，错误写入 `errors`，不影响其它分区。

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::warn;

use crate::domain::overview::DashboardOverview;
use crate::error::CollectError;
use crate::services::Collectors;

/// 组装总览快照
pub async fn overview(collectors: &Collectors) -> DashboardOverview {
    let (system, containers, sites, redis, backup) = tokio::join!(
        collectors.host.collect(),
        collectors.dashboard_containers(),
        collectors.sites.collect(),
        collectors.cache.collect(),
        collectors.backup.stats(),
    );

    let mut errors = BTreeMap::new();

    DashboardOverview {
        generated_at: Utc::now(),
        system: section("system", system, &mut errors),
        containers: section("containers", containers, &mut errors),
        wordpress_sites: Some(sites),
        redis: section("redis", redis, &mut errors),
        backup: section("backup", backup, &mut errors),
        errors,
    }
}

/// 成功时返回数据，失败时记录错误并返回 None
fn section<T>(
    name: &'static str,
    result: Result<T, CollectError>,
    errors: &mut BTreeMap<&'static str, String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(section = name, error = %e, "Overview section unavailable");
            errors.insert(name, e.to_string());
            None
        }
    }
}
