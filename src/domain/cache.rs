//! Redis 缓存统计领域模型

use serde::Serialize;

use crate::domain::format::{percent, two_decimals};

/// 缓存统计
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CacheStats {
    #[serde(serialize_with = "two_decimals")]
    pub memory_used_mb: f64,
    /// 配置值（maxmemory），不是实时查询结果
    pub memory_total_mb: f64,
    #[serde(serialize_with = "two_decimals")]
    pub memory_percent: f64,
    pub total_keys: u64,
    pub commands_processed: u64,
    #[serde(serialize_with = "two_decimals")]
    pub cache_hit_rate: f64,
    pub connected_clients: u64,
    pub uptime_days: u64,
}

/// 命中率（百分比），没有请求时为 0
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits.saturating_add(misses);
    percent(hits as f64, total as f64)
}
