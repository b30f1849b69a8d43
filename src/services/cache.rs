//! Redis 缓存统计采集

use std::collections::HashMap;
use tracing::debug;

use crate::config::RedisConfig;
use crate::domain::cache::{hit_rate, CacheStats};
use crate::domain::format::{bytes_to_mb, percent};
use crate::error::CollectError;
use crate::infra::docker::DockerCli;

/// redis 的逻辑库数量
const DB_SLOTS: usize = 16;
const SECONDS_PER_DAY: u64 = 86_400;

/// Redis 统计采集器
#[derive(Clone)]
pub struct CacheCollector {
    docker: DockerCli,
    config: RedisConfig,
}

impl CacheCollector {
    pub fn new(docker: DockerCli, config: RedisConfig) -> Self {
        Self { docker, config }
    }

    pub async fn collect(&self) -> Result<CacheStats, CollectError> {
        let output = self
            .docker
            .exec_in(&self.config.container, &["redis-cli", "INFO"])
            .await?;

        let info = parse_info(&output);
        debug!(fields = info.len(), container = %self.config.container, "Parsed redis INFO");

        build_stats(&info, self.config.capacity_mb)
    }
}

/// 解析 `redis-cli INFO` 输出为 key → value
///
/// 跳过 `#` 开头的分节标题与空行，值中可能带 `\r`
pub fn parse_info(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// 所有 `dbN` 行中 `keys=<n>` 的总和
pub fn total_keys(info: &HashMap<String, String>) -> Result<u64, CollectError> {
    let mut total = 0u64;
    for slot in 0..DB_SLOTS {
        let key = format!("db{}", slot);
        let Some(value) = info.get(&key) else {
            continue;
        };
        let keys = value
            .split(',')
            .find_map(|part| part.strip_prefix("keys="))
            .ok_or_else(|| CollectError::parse(format!("{} has no keys field: {}", key, value)))?;
        total += keys
            .parse::<u64>()
            .map_err(|e| CollectError::parse(format!("{} keys '{}': {}", key, keys, e)))?;
    }
    Ok(total)
}

/// 读取数值字段，缺失时为 0，格式错误时报解析错误
fn field<T>(info: &HashMap<String, String>, key: &str) -> Result<T, CollectError>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match info.get(key) {
        None => Ok(T::default()),
        Some(raw) => raw
            .parse()
            .map_err(|e| CollectError::parse(format!("{} '{}': {}", key, raw, e))),
    }
}

fn build_stats(info: &HashMap<String, String>, capacity_mb: f64) -> Result<CacheStats, CollectError> {
    let used_bytes: u64 = field(info, "used_memory")?;
    let hits: u64 = field(info, "keyspace_hits")?;
    let misses: u64 = field(info, "keyspace_misses")?;
    let uptime_seconds: u64 = field(info, "uptime_in_seconds")?;

    let memory_used_mb = bytes_to_mb(used_bytes);

    Ok(CacheStats {
        memory_used_mb,
        memory_total_mb: capacity_mb,
        memory_percent: percent(memory_used_mb, capacity_mb),
        total_keys: total_keys(info)?,
        commands_processed: field(info, "total_commands_processed")?,
        cache_hit_rate: hit_rate(hits, misses),
        connected_clients: field(info, "connected_clients")?,
        uptime_days: uptime_seconds / SECONDS_PER_DAY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::ScriptedExecutor;
    use std::sync::Arc;

    const INFO: &str = "# Server\r\n\
        redis_version:7.2.4\r\n\
        uptime_in_seconds:259300\r\n\
        \r\n\
        # Clients\r\n\
        connected_clients:12\r\n\
        \r\n\
        # Memory\r\n\
        used_memory:134217728\r\n\
        used_memory_human:128.00M\r\n\
        \r\n\
        # Stats\r\n\
        total_commands_processed:98765\r\n\
        keyspace_hits:900\r\n\
        keyspace_misses:100\r\n\
        \r\n\
        # Keyspace\r\n\
        db0:keys=120,expires=10,avg_ttl=0\r\n\
        db3:keys=5,expires=0,avg_ttl=0\r\n";

    fn config() -> RedisConfig {
        RedisConfig {
            container: "blog-redis".to_string(),
            capacity_mb: 512.0,
        }
    }

    #[test]
    fn test_parse_info_skips_comments() {
        let info = parse_info(INFO);
        assert_eq!(info.get("redis_version").map(String::as_str), Some("7.2.4"));
        assert!(!info.keys().any(|k| k.starts_with('#')));
        assert_eq!(info.get("db0").map(String::as_str), Some("keys=120,expires=10,avg_ttl=0"));
    }

    #[test]
    fn test_total_keys() {
        let info = parse_info(INFO);
        assert_eq!(total_keys(&info).unwrap(), 125);
        assert_eq!(total_keys(&HashMap::new()).unwrap(), 0);
    }

    #[test]
    fn test_build_stats() {
        let stats = build_stats(&parse_info(INFO), 512.0).unwrap();
        assert_eq!(stats.memory_used_mb, 128.0);
        assert_eq!(stats.memory_total_mb, 512.0);
        assert_eq!(stats.memory_percent, 25.0);
        assert_eq!(stats.total_keys, 125);
        assert_eq!(stats.commands_processed, 98765);
        assert_eq!(stats.cache_hit_rate, 90.0);
        assert_eq!(stats.connected_clients, 12);
        assert_eq!(stats.uptime_days, 3);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let stats = build_stats(&parse_info("# Server\nredis_version:7.0.0\n"), 512.0).unwrap();
        assert_eq!(stats.cache_hit_rate, 0.0);
        assert_eq!(stats.total_keys, 0);
        assert_eq!(stats.memory_percent, 0.0);
    }

    #[test]
    fn test_malformed_value_is_parse_error() {
        let result = build_stats(&parse_info("used_memory:lots\n"), 512.0);
        assert!(matches!(result, Err(CollectError::Parse(_))));

        let result = build_stats(&parse_info("db0:expires=1\n"), 512.0);
        assert!(matches!(result, Err(CollectError::Parse(_))));
    }

    #[tokio::test]
    async fn test_collect() {
        let exec = ScriptedExecutor::new().stdout("docker exec -i blog-redis redis-cli INFO", INFO);
        let collector = CacheCollector::new(DockerCli::new(Arc::new(exec), "docker"), config());
        let stats = collector.collect().await.unwrap();
        assert_eq!(stats.total_keys, 125);
    }

    #[tokio::test]
    async fn test_collect_fails_when_container_missing() {
        let exec = ScriptedExecutor::new().fail("docker exec", "Error: No such container: blog-redis");
        let collector = CacheCollector::new(DockerCli::new(Arc::new(exec), "docker"), config());
        assert!(matches!(
            collector.collect().await,
            Err(CollectError::CommandFailed(_))
        ));
    }
}
