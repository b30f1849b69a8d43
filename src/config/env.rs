//! 环境变量配置加载

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::domain::backup::BackupSchedule;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 监听地址
    pub host: String,
    /// 服务监听端口
    pub port: u16,
    /// 外部命令超时
    pub command_timeout: Duration,
    /// 单次请求内并发探测的上限（容器 stats、站点状态）
    pub probe_concurrency: usize,
    /// procfs 挂载点
    pub proc_root: PathBuf,
    /// 统计磁盘使用率的挂载点
    pub disk_mount: String,
    /// docker 可执行文件
    pub docker_bin: String,
    /// 仪表盘容器分区的名称前缀过滤
    pub dashboard_container_prefix: Option<String>,
    pub redis: RedisConfig,
    pub wordpress: WordPressConfig,
    pub backup: BackupConfig,
}

/// Redis 配置
#[derive(Clone, Debug)]
pub struct RedisConfig {
    /// 运行 redis 的容器
    pub container: String,
    /// maxmemory（MB），与 compose 文件中的设置保持一致
    pub capacity_mb: f64,
}

/// WordPress 配置
#[derive(Clone, Debug)]
pub struct WordPressConfig {
    /// 运行 wp-cli 的容器
    pub container: String,
    /// 容器内站点根目录，站点安装在 `<sites_root>/<site_id>`
    pub sites_root: String,
}

/// 备份配置
#[derive(Clone, Debug)]
pub struct BackupConfig {
    pub mailserver_root: PathBuf,
    pub blog_root: PathBuf,
    pub schedule: BackupSchedule,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_or("PORT", 8000);

        let command_timeout = Duration::from_secs(parse_or("COMMAND_TIMEOUT_SECS", 30));

        let probe_concurrency = parse_or("PROBE_CONCURRENCY", 4usize);
        let probe_concurrency = if probe_concurrency == 0 {
            warn!("PROBE_CONCURRENCY must be positive, using 1");
            1
        } else {
            probe_concurrency
        };

        let proc_root = env::var("PROC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/proc"));
        let disk_mount = env::var("DISK_MOUNT").unwrap_or_else(|_| "/".to_string());
        let docker_bin = env::var("DOCKER_BIN").unwrap_or_else(|_| "docker".to_string());

        // 设置为空字符串表示不过滤
        let dashboard_container_prefix = match env::var("DASHBOARD_CONTAINER_PREFIX") {
            Ok(v) if v.is_empty() => None,
            Ok(v) => Some(v),
            Err(_) => Some("blog-".to_string()),
        };

        Self {
            host,
            port,
            command_timeout,
            probe_concurrency,
            proc_root,
            disk_mount,
            docker_bin,
            dashboard_container_prefix,
            redis: RedisConfig::from_env(),
            wordpress: WordPressConfig::from_env(),
            backup: BackupConfig::from_env(),
        }
    }
}

impl RedisConfig {
    pub fn from_env() -> Self {
        Self {
            container: env::var("REDIS_CONTAINER").unwrap_or_else(|_| "blog-redis".to_string()),
            capacity_mb: parse_or("REDIS_MAXMEMORY_MB", 512.0),
        }
    }
}

impl WordPressConfig {
    pub fn from_env() -> Self {
        Self {
            container: env::var("WORDPRESS_CONTAINER")
                .unwrap_or_else(|_| "blog-wordpress".to_string()),
            sites_root: env::var("WORDPRESS_SITES_ROOT")
                .unwrap_or_else(|_| "/var/www/html".to_string()),
        }
    }
}

impl BackupConfig {
    pub fn from_env() -> Self {
        let mailserver_root = env::var("BACKUP_MAILSERVER_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/mnt/backup-hdd/mailserver"));
        let blog_root = env::var("BACKUP_BLOG_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/mnt/backup-hdd/rental/blog"));

        let schedule = BackupSchedule {
            mailserver_daily: env::var("BACKUP_SCHEDULE_MAILSERVER_DAILY")
                .unwrap_or_else(|_| "Daily at 03:00 AM".to_string()),
            mailserver_weekly: env::var("BACKUP_SCHEDULE_MAILSERVER_WEEKLY")
                .unwrap_or_else(|_| "Sunday at 02:00 AM".to_string()),
            s3_replication: env::var("BACKUP_SCHEDULE_S3_REPLICATION")
                .unwrap_or_else(|_| "Daily at 04:00 AM".to_string()),
            malware_scan: env::var("BACKUP_SCHEDULE_MALWARE_SCAN")
                .unwrap_or_else(|_| "Daily at 05:00 AM".to_string()),
        };

        Self {
            mailserver_root,
            blog_root,
            schedule,
        }
    }
}

/// 解析环境变量，缺失时使用默认值，格式错误时告警后使用默认值
fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %raw, default = ?default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// 常量
pub mod constants {
    /// 服务名
    pub const SERVICE_NAME: &str = "portal-dashboard-agent";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        env::set_var("TEST_PARSE_OR_PORT", "9100");
        assert_eq!(parse_or("TEST_PARSE_OR_PORT", 8000u16), 9100);

        env::set_var("TEST_PARSE_OR_PORT", "not-a-number");
        assert_eq!(parse_or("TEST_PARSE_OR_PORT", 8000u16), 8000);

        env::remove_var("TEST_PARSE_OR_PORT");
        assert_eq!(parse_or("TEST_PARSE_OR_PORT", 8000u16), 8000);
    }

    #[test]
    fn test_backup_defaults() {
        let config = BackupConfig::from_env();
        assert_eq!(config.schedule.mailserver_weekly, "Sunday at 02:00 AM");
    }
}
