//! 备份相关领域模型
//!
//! 备份目录布局：`<root>/{daily,weekly}/<label>/...`，
//! label 为 `YYYY-MM-DD` 或 `YYYY-week-WW`

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::domain::format::{bytes_to_mb, two_decimals, BYTES_PER_MB};

/// 备份日期标签
///
/// ISO 日期之间可以按时间比较；周标签只能按字符串比较，优先级低于 ISO 日期
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackupDateLabel {
    Iso(NaiveDate),
    Week(String),
    Unknown,
}

impl BackupDateLabel {
    /// 从路径中提取标签，从最后一段向前找第一段合法的日期或周标签
    pub fn from_path(path: &Path) -> Self {
        path.components()
            .rev()
            .filter_map(|c| c.as_os_str().to_str())
            .find_map(Self::from_component)
            .unwrap_or(Self::Unknown)
    }

    /// 解析单个路径段
    pub fn from_component(part: &str) -> Option<Self> {
        if part.len() == 10 && part.matches('-').count() == 2 {
            if let Ok(date) = NaiveDate::parse_from_str(part, "%Y-%m-%d") {
                // 只接受补零的规范写法，保证标签与目录名完全一致
                if date.format("%Y-%m-%d").to_string() == part {
                    return Some(Self::Iso(date));
                }
            }
        }
        if part.to_lowercase().contains("week") && part.matches('-').count() == 2 {
            return Some(Self::Week(part.to_string()));
        }
        None
    }
}

impl fmt::Display for BackupDateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Week(label) => f.write_str(label),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for BackupDateLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 选出最近一次备份的标签
///
/// 1. 有 ISO 日期时取最大的日期
/// 2. 否则在周标签中取字符串最大者（只是近似）
/// 3. 全部未知时返回 `Unknown`
pub fn most_recent<'a, I>(labels: I) -> BackupDateLabel
where
    I: IntoIterator<Item = &'a BackupDateLabel>,
{
    let mut latest_date: Option<NaiveDate> = None;
    let mut latest_week: Option<&str> = None;

    for label in labels {
        match label {
            BackupDateLabel::Iso(date) => {
                latest_date = Some(latest_date.map_or(*date, |d| d.max(*date)));
            }
            BackupDateLabel::Week(week) => {
                latest_week = Some(latest_week.map_or(week.as_str(), |w| w.max(week.as_str())));
            }
            BackupDateLabel::Unknown => {}
        }
    }

    match (latest_date, latest_week) {
        (Some(date), _) => BackupDateLabel::Iso(date),
        (None, Some(week)) => BackupDateLabel::Week(week.to_string()),
        (None, None) => BackupDateLabel::Unknown,
    }
}

/// 备份来源
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupOrigin {
    Mailserver,
    Blog,
}

/// 备份周期
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupTier {
    Daily,
    Weekly,
}

impl BackupTier {
    pub const ALL: [BackupTier; 2] = [BackupTier::Daily, BackupTier::Weekly];

    /// 目录名
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

/// 单个备份
#[derive(Clone, Debug, Serialize)]
pub struct BackupEntry {
    pub date: BackupDateLabel,
    pub size_bytes: u64,
    #[serde(serialize_with = "two_decimals")]
    pub size_mb: f64,
    pub path: String,
    /// daily / weekly / blog-daily / blog-weekly
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip)]
    pub origin: BackupOrigin,
    #[serde(skip)]
    pub tier: BackupTier,
}

impl BackupEntry {
    pub fn new(path: &Path, size_bytes: u64, origin: BackupOrigin, tier: BackupTier) -> Self {
        let kind = match origin {
            BackupOrigin::Mailserver => tier.dir_name().to_string(),
            BackupOrigin::Blog => format!("blog-{}", tier.dir_name()),
        };

        Self {
            date: BackupDateLabel::from_path(path),
            size_bytes,
            size_mb: bytes_to_mb(size_bytes),
            path: path.to_string_lossy().to_string(),
            kind,
            origin,
            tier,
        }
    }
}

/// 邮件服务器备份列表
#[derive(Debug, Serialize)]
pub struct MailserverBackups {
    pub daily: Vec<BackupEntry>,
    pub weekly: Vec<BackupEntry>,
}

/// 博客备份列表
#[derive(Debug, Serialize)]
pub struct BlogBackups {
    pub backups: Vec<BackupEntry>,
}

/// 备份统计
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BackupStats {
    pub total_backups: usize,
    pub total_size_bytes: u64,
    #[serde(serialize_with = "two_decimals")]
    pub total_size_mb: f64,
    #[serde(serialize_with = "two_decimals")]
    pub total_size_gb: f64,
    pub last_backup: String,
    pub mailserver_backups: usize,
    pub blog_backups: usize,
    pub mailserver_daily: usize,
    pub mailserver_weekly: usize,
    pub blog_daily: usize,
    pub blog_weekly: usize,
}

impl BackupStats {
    /// 从备份列表聚合统计
    pub fn from_entries(entries: &[BackupEntry]) -> Self {
        let count = |origin: BackupOrigin, tier: BackupTier| {
            entries
                .iter()
                .filter(|e| e.origin == origin && e.tier == tier)
                .count()
        };

        let mailserver_daily = count(BackupOrigin::Mailserver, BackupTier::Daily);
        let mailserver_weekly = count(BackupOrigin::Mailserver, BackupTier::Weekly);
        let blog_daily = count(BackupOrigin::Blog, BackupTier::Daily);
        let blog_weekly = count(BackupOrigin::Blog, BackupTier::Weekly);

        let total_size_bytes: u64 = entries.iter().map(|e| e.size_bytes).sum();

        Self {
            total_backups: entries.len(),
            total_size_bytes,
            total_size_mb: bytes_to_mb(total_size_bytes),
            total_size_gb: total_size_bytes as f64 / BYTES_PER_MB / 1024.0,
            last_backup: most_recent(entries.iter().map(|e| &e.date)).to_string(),
            mailserver_backups: mailserver_daily + mailserver_weekly,
            blog_backups: blog_daily + blog_weekly,
            mailserver_daily,
            mailserver_weekly,
            blog_daily,
            blog_weekly,
        }
    }
}

/// 备份计划（来自配置）
#[derive(Clone, Debug, Serialize)]
pub struct BackupSchedule {
    pub mailserver_daily: String,
    pub mailserver_weekly: String,
    pub s3_replication: String,
    pub malware_scan: String,
}
