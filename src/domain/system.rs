//! 主机信息领域模型

use serde::Serialize;

use crate::domain::format::two_decimals;

/// 主机资源快照
///
/// CPU 使用率来自 /proc/stat 的单次累计采样（自开机以来），不是区间平均值
#[derive(Clone, Debug, Serialize)]
pub struct HostMetrics {
    #[serde(serialize_with = "two_decimals")]
    pub cpu_percent: f64,
    #[serde(serialize_with = "two_decimals")]
    pub memory_total_gb: f64,
    #[serde(serialize_with = "two_decimals")]
    pub memory_used_gb: f64,
    #[serde(serialize_with = "two_decimals")]
    pub memory_percent: f64,
    pub disk_total_gb: f64,
    pub disk_used_gb: f64,
    pub disk_percent: f64,
    /// 1, 5, 15 分钟负载
    pub load_average: [f64; 3],
    #[serde(serialize_with = "two_decimals")]
    pub uptime_seconds: f64,
}
