//! 仪表盘总览

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::backup::BackupStats;
use crate::domain::cache::CacheStats;
use crate::domain::container::ContainerSummary;
use crate::domain::site::SiteStatus;
use crate::domain::system::HostMetrics;

/// 总览快照
///
/// 每个分区独立采集：失败的分区为 null，错误信息记录在 `errors` 中
#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub generated_at: DateTime<Utc>,
    pub system: Option<HostMetrics>,
    pub containers: Option<Vec<ContainerSummary>>,
    pub wordpress_sites: Option<Vec<SiteStatus>>,
    pub redis: Option<CacheStats>,
    pub backup: Option<BackupStats>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
}
