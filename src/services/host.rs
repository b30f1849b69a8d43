//! 主机资源采集
//!
//! 读取 procfs（stat / meminfo / loadavg / uptime）并调用 `df` 获取磁盘使用率。
//! 任何一项读取或解析失败都会让整次采集失败，不返回部分结果。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::domain::format::percent;
use crate::domain::system::HostMetrics;
use crate::error::CollectError;
use crate::infra::command::CommandExecutor;

const KB_PER_GB: f64 = 1024.0 * 1024.0;

/// 主机资源采集器
#[derive(Clone)]
pub struct HostCollector {
    proc_root: PathBuf,
    disk_mount: String,
    exec: Arc<dyn CommandExecutor>,
}

/// /proc/meminfo 中用到的两个值（kB）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub available_kb: u64,
}

/// `df` 输出中的根分区使用情况（GB）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
}

impl HostCollector {
    pub fn new(
        proc_root: impl Into<PathBuf>,
        disk_mount: impl Into<String>,
        exec: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            proc_root: proc_root.into(),
            disk_mount: disk_mount.into(),
            exec,
        }
    }

    pub async fn collect(&self) -> Result<HostMetrics, CollectError> {
        let cpu_percent = parse_cpu_percent(&self.read("stat").await?)?;
        let mem = parse_meminfo(&self.read("meminfo").await?)?;
        let load_average = parse_loadavg(&self.read("loadavg").await?)?;
        let uptime_seconds = parse_uptime(&self.read("uptime").await?)?;

        let df = self
            .exec
            .run("df", &["-P", "-BG", self.disk_mount.as_str()])
            .await?;
        let disk = parse_df(&df)?;

        let memory_total_gb = mem.total_kb as f64 / KB_PER_GB;
        let memory_used_gb = memory_total_gb - mem.available_kb as f64 / KB_PER_GB;

        Ok(HostMetrics {
            cpu_percent,
            memory_total_gb,
            memory_used_gb,
            memory_percent: percent(memory_used_gb, memory_total_gb),
            disk_total_gb: disk.total_gb,
            disk_used_gb: disk.used_gb,
            disk_percent: disk.percent,
            load_average,
            uptime_seconds,
        })
    }

    async fn read(&self, name: &str) -> Result<String, CollectError> {
        let path = self.proc_root.join(name);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to read procfs file");
            CollectError::Io(e)
        })
    }
}

/// CPU 使用率：`100 * (total - idle) / total`，取 /proc/stat 第一行的累计值
pub fn parse_cpu_percent(stat: &str) -> Result<f64, CollectError> {
    let line = stat
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| CollectError::parse("missing aggregate cpu line in /proc/stat"))?;

    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CollectError::parse(format!("invalid cpu counter: {}", e)))?;

    if values.len() < 4 {
        return Err(CollectError::parse("too few cpu counters in /proc/stat"));
    }

    let total: f64 = values.iter().sum();
    let idle = values[3];
    Ok(if total > 0.0 {
        100.0 * (total - idle) / total
    } else {
        0.0
    })
}

/// 解析 /proc/meminfo，MemAvailable 缺失时回落到 MemFree
pub fn parse_meminfo(meminfo: &str) -> Result<MemInfo, CollectError> {
    let values: HashMap<&str, u64> = meminfo
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim(), value))
        })
        .collect();

    let total_kb = *values
        .get("MemTotal")
        .ok_or_else(|| CollectError::parse("MemTotal missing from /proc/meminfo"))?;
    let available_kb = values
        .get("MemAvailable")
        .or_else(|| values.get("MemFree"))
        .copied()
        .ok_or_else(|| CollectError::parse("neither MemAvailable nor MemFree in /proc/meminfo"))?;

    Ok(MemInfo {
        total_kb,
        available_kb,
    })
}

/// 解析 /proc/loadavg 的前三个值
pub fn parse_loadavg(loadavg: &str) -> Result<[f64; 3], CollectError> {
    let values = loadavg
        .split_whitespace()
        .take(3)
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CollectError::parse(format!("invalid load average: {}", e)))?;

    match values.as_slice() {
        [one, five, fifteen] => Ok([*one, *five, *fifteen]),
        _ => Err(CollectError::parse("expected three load average values")),
    }
}

/// 解析 /proc/uptime 的第一个值（秒）
pub fn parse_uptime(uptime: &str) -> Result<f64, CollectError> {
    uptime
        .split_whitespace()
        .next()
        .ok_or_else(|| CollectError::parse("empty /proc/uptime"))?
        .parse()
        .map_err(|e| CollectError::parse(format!("invalid uptime: {}", e)))
}

/// 解析 `df -P -BG <mount>` 输出，单位为 GB
///
/// ```text
/// Filesystem     1G-blocks  Used Available Capacity Mounted on
/// /dev/sda1           457G  123G      311G      29% /
/// ```
pub fn parse_df(df: &str) -> Result<DiskUsage, CollectError> {
    let row = df
        .lines()
        .nth(1)
        .ok_or_else(|| CollectError::parse("df output has no data row"))?;
    let fields: Vec<&str> = row.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(CollectError::parse(format!("unexpected df row: {}", row)));
    }

    let number = |field: &str, suffix: char| -> Result<f64, CollectError> {
        field
            .trim_end_matches(suffix)
            .parse::<f64>()
            .map_err(|e| CollectError::parse(format!("invalid df field '{}': {}", field, e)))
    };

    Ok(DiskUsage {
        total_gb: number(fields[1], 'G')?,
        used_gb: number(fields[2], 'G')?,
        percent: number(fields[4], '%')?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::round2;
    use crate::infra::testing::ScriptedExecutor;

    const STAT: &str = "cpu  100 0 100 800 0 0 0 0 0 0\ncpu0 50 0 50 400 0 0 0 0 0 0\n";
    const MEMINFO: &str = "MemTotal:       16777216 kB\nMemFree:         1048576 kB\nMemAvailable:    4194304 kB\n";
    const DF: &str = "Filesystem     1G-blocks  Used Available Capacity Mounted on\n/dev/sda1           100G   40G       60G      40% /\n";

    fn write_proc(dir: &std::path::Path, meminfo: &str) {
        std::fs::write(dir.join("stat"), STAT).unwrap();
        std::fs::write(dir.join("meminfo"), meminfo).unwrap();
        std::fs::write(dir.join("loadavg"), "0.52 0.58 0.59 1/389 12345\n").unwrap();
        std::fs::write(dir.join("uptime"), "350735.47 234388.90\n").unwrap();
    }

    #[test]
    fn test_parse_cpu_percent() {
        assert_eq!(round2(parse_cpu_percent(STAT).unwrap()), 20.0);
        assert_eq!(parse_cpu_percent("cpu  0 0 0 0\n").unwrap(), 0.0);
        assert!(parse_cpu_percent("intr 1 2 3\n").is_err());
    }

    #[test]
    fn test_parse_cpu_percent_is_not_skewed_by_float_rounding() {
        // 200 busy / 1000 total
        assert_eq!(parse_cpu_percent("cpu  100 0 100 800 0 0 0 0 0 0\n").unwrap(), 20.0);
        // 256 busy / 1024 total
        assert_eq!(parse_cpu_percent("cpu  128 0 128 768\n").unwrap(), 25.0);
    }

    #[test]
    fn test_parse_meminfo_prefers_available() {
        let mem = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(mem.total_kb, 16_777_216);
        assert_eq!(mem.available_kb, 4_194_304);
    }

    #[test]
    fn test_parse_meminfo_falls_back_to_free() {
        let mem = parse_meminfo("MemTotal: 2048 kB\nMemFree: 512 kB\n").unwrap();
        assert_eq!(mem.available_kb, 512);
        assert!(parse_meminfo("MemFree: 512 kB\n").is_err());
    }

    #[test]
    fn test_parse_loadavg_and_uptime() {
        assert_eq!(
            parse_loadavg("0.52 0.58 0.59 1/389 12345").unwrap(),
            [0.52, 0.58, 0.59]
        );
        assert!(parse_loadavg("0.52").is_err());
        assert_eq!(parse_uptime("350735.47 234388.90").unwrap(), 350735.47);
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn test_parse_df() {
        let disk = parse_df(DF).unwrap();
        assert_eq!(disk.total_gb, 100.0);
        assert_eq!(disk.used_gb, 40.0);
        assert_eq!(disk.percent, 40.0);
        assert!(parse_df("Filesystem 1G-blocks\n").is_err());
    }

    #[tokio::test]
    async fn test_collect() {
        let dir = tempfile::tempdir().unwrap();
        write_proc(dir.path(), MEMINFO);
        let exec = Arc::new(ScriptedExecutor::new().stdout("df -P -BG /", DF));
        let collector = HostCollector::new(dir.path(), "/", exec);

        let metrics = collector.collect().await.unwrap();
        assert_eq!(round2(metrics.cpu_percent), 20.0);
        assert_eq!(metrics.memory_total_gb, 16.0);
        assert_eq!(metrics.memory_used_gb, 12.0);
        assert_eq!(metrics.memory_percent, 75.0);
        assert_eq!(metrics.disk_percent, 40.0);
        assert_eq!(metrics.load_average, [0.52, 0.58, 0.59]);
    }

    #[tokio::test]
    async fn test_collect_fails_without_procfs_file() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::new().stdout("df", DF));
        let collector = HostCollector::new(dir.path(), "/", exec);

        assert!(matches!(collector.collect().await, Err(CollectError::Io(_))));
    }

    #[tokio::test]
    async fn test_collect_fails_when_df_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_proc(dir.path(), MEMINFO);
        let exec = Arc::new(ScriptedExecutor::new().fail("df", "df: /: No such file"));
        let collector = HostCollector::new(dir.path(), "/", exec);

        assert!(matches!(
            collector.collect().await,
            Err(CollectError::CommandFailed(_))
        ));
    }
}
