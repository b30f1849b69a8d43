//! 备份清单采集
//!
//! 只读取本地备份目录，不执行外部命令。目录遍历在 blocking 线程池中进行。

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::BackupConfig;
use crate::domain::backup::{
    BackupEntry, BackupOrigin, BackupSchedule, BackupStats, BackupTier, BlogBackups,
    MailserverBackups,
};
use crate::error::CollectError;

/// 备份清单采集器
#[derive(Clone)]
pub struct BackupCollector {
    config: BackupConfig,
}

impl BackupCollector {
    pub fn new(config: BackupConfig) -> Self {
        Self { config }
    }

    /// 邮件服务器备份（daily + weekly）
    pub async fn mailserver(&self) -> Result<MailserverBackups, CollectError> {
        let root = self.config.mailserver_root.clone();
        let backups = tokio::task::spawn_blocking(move || MailserverBackups {
            daily: list(&root, BackupOrigin::Mailserver, BackupTier::Daily),
            weekly: list(&root, BackupOrigin::Mailserver, BackupTier::Weekly),
        })
        .await?;
        Ok(backups)
    }

    /// 博客备份（daily 在前，weekly 在后）
    pub async fn blog(&self) -> Result<BlogBackups, CollectError> {
        let root = self.config.blog_root.clone();
        let backups = tokio::task::spawn_blocking(move || list_all(&root, BackupOrigin::Blog)).await?;
        Ok(BlogBackups { backups })
    }

    /// 全部备份的汇总统计
    pub async fn stats(&self) -> Result<BackupStats, CollectError> {
        let mailserver_root = self.config.mailserver_root.clone();
        let blog_root = self.config.blog_root.clone();

        let stats = tokio::task::spawn_blocking(move || {
            let mut entries = list_all(&mailserver_root, BackupOrigin::Mailserver);
            entries.extend(list_all(&blog_root, BackupOrigin::Blog));
            BackupStats::from_entries(&entries)
        })
        .await?;

        debug!(
            total = stats.total_backups,
            last_backup = %stats.last_backup,
            "Backup stats collected"
        );
        Ok(stats)
    }

    /// 备份计划（配置值）
    pub fn schedule(&self) -> BackupSchedule {
        self.config.schedule.clone()
    }
}

fn list_all(root: &Path, origin: BackupOrigin) -> Vec<BackupEntry> {
    BackupTier::ALL
        .iter()
        .flat_map(|tier| list(root, origin, *tier))
        .collect()
}

/// 列出 `<root>/<tier>` 下的备份目录
///
/// 按目录名字典序降序。目录不存在时返回空列表
pub fn list(root: &Path, origin: BackupOrigin, tier: BackupTier) -> Vec<BackupEntry> {
    let dir = root.join(tier.dir_name());

    let read_dir = match fs::read_dir(&dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Backup directory does not exist");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to read backup directory");
            return Vec::new();
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = read_dir
        .filter_map(Result::ok)
        // 跟随符号链接，指向目录的链接也算一个备份
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            (!name.starts_with('.')).then(|| (name, entry.path()))
        })
        .collect();
    dirs.sort_by(|a, b| b.0.cmp(&a.0));

    dirs.into_iter()
        .map(|(_, path)| BackupEntry::new(&path, directory_size(&path), origin, tier))
        .collect()
}

/// 目录下所有文件大小之和
///
/// 文件符号链接按目标大小计算；无法读取的条目与悬空链接直接跳过
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| !entry.file_type().is_dir())
        .filter_map(|entry| fs::metadata(entry.path()).ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backup::BackupDateLabel;
    use std::fs;

    fn write_file(path: &Path, size: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; size]).unwrap();
    }

    fn config(root: &Path) -> BackupConfig {
        BackupConfig {
            mailserver_root: root.join("mailserver"),
            blog_root: root.join("blog"),
            schedule: BackupSchedule {
                mailserver_daily: "Daily at 03:00 AM".to_string(),
                mailserver_weekly: "Sunday at 02:00 AM".to_string(),
                s3_replication: "Daily at 04:00 AM".to_string(),
                malware_scan: "Daily at 05:00 AM".to_string(),
            },
        }
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list(&missing, BackupOrigin::Mailserver, BackupTier::Daily).is_empty());
    }

    #[test]
    fn test_empty_tier_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("daily")).unwrap();
        assert!(list(dir.path(), BackupOrigin::Mailserver, BackupTier::Daily).is_empty());
    }

    #[test]
    fn test_list_sorted_descending_and_sized() {
        let dir = tempfile::tempdir().unwrap();
        let daily = dir.path().join("daily");
        write_file(&daily.join("2024-01-01/mail.tar.gz"), 1_048_576);
        write_file(&daily.join("2024-03-01/mail.tar.gz"), 10);
        write_file(&daily.join("2024-03-01/nested/extra"), 5);
        write_file(&daily.join(".partial/mail.tar.gz"), 1);
        write_file(&daily.join("stray-file"), 1);

        let entries = list(dir.path(), BackupOrigin::Mailserver, BackupTier::Daily);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date.to_string(), "2024-03-01");
        assert_eq!(entries[0].size_bytes, 15);
        assert_eq!(entries[1].size_bytes, 1_048_576);
        assert_eq!(entries[1].size_mb, 1.0);
        assert_eq!(entries[1].kind, "daily");

        let json = serde_json::to_value(&entries[1]).unwrap();
        assert_eq!(json["size_mb"], 1.0);
        assert_eq!(json["type"], "daily");
        assert_eq!(json["date"], "2024-01-01");
    }

    #[test]
    fn test_non_date_directories_are_unknown() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("weekly/2024-week-05")).unwrap();
        fs::create_dir_all(dir.path().join("weekly/manual")).unwrap();

        let entries = list(dir.path(), BackupOrigin::Blog, BackupTier::Weekly);
        assert_eq!(entries[0].date, BackupDateLabel::Unknown);
        assert_eq!(entries[0].kind, "blog-weekly");
        assert_eq!(entries[1].date, BackupDateLabel::Week("2024-week-05".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_backup_directory_is_listed() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store/2024-05-01");
        write_file(&store.join("mail.tar.gz"), 64);
        fs::create_dir_all(dir.path().join("daily")).unwrap();
        symlink(&store, dir.path().join("daily/2024-05-01")).unwrap();

        let entries = list(dir.path(), BackupOrigin::Mailserver, BackupTier::Daily);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date.to_string(), "2024-05-01");
        assert_eq!(entries[0].size_bytes, 64);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_size_follows_file_links_and_skips_dangling() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("2024-05-02");
        write_file(&dir.path().join("outside/blob"), 100);
        write_file(&backup.join("db.sql"), 10);
        symlink(dir.path().join("outside/blob"), backup.join("blob")).unwrap();
        symlink(dir.path().join("missing"), backup.join("dangling")).unwrap();

        assert_eq!(directory_size(&backup), 110);
    }

    #[tokio::test]
    async fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let collector = BackupCollector::new(config(dir.path()));
        write_file(&dir.path().join("mailserver/daily/2024-03-01/a"), 1024);
        write_file(&dir.path().join("mailserver/weekly/2024-week-09/a"), 1024);
        write_file(&dir.path().join("blog/daily/2024-02-15/a"), 2048);

        let stats = collector.stats().await.unwrap();
        assert_eq!(stats.total_backups, 3);
        assert_eq!(stats.total_size_bytes, 4096);
        assert_eq!(stats.last_backup, "2024-03-01");
        assert_eq!(stats.mailserver_backups, 2);
        assert_eq!(stats.blog_backups, 1);
        assert_eq!(stats.mailserver_weekly, 1);
        assert_eq!(stats.blog_weekly, 0);
    }

    #[tokio::test]
    async fn test_stats_without_backups() {
        let dir = tempfile::tempdir().unwrap();
        let collector = BackupCollector::new(config(dir.path()));

        let stats = collector.stats().await.unwrap();
        assert_eq!(stats.total_backups, 0);
        assert_eq!(stats.last_backup, "unknown");

        let mailserver = collector.mailserver().await.unwrap();
        assert!(mailserver.daily.is_empty() && mailserver.weekly.is_empty());
        assert!(collector.blog().await.unwrap().backups.is_empty());
    }

    #[test]
    fn test_schedule_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = BackupCollector::new(config(dir.path())).schedule();
        assert_eq!(schedule.s3_replication, "Daily at 04:00 AM");
    }
}
