//! WordPress 站点注册表
//!
//! 启动时加载一次，注入到站点状态采集器。来源优先级：
//! 1. `SITE_REGISTRY_FILE`：JSON 数组 `[{"site_id": "...", "url": "..."}]`
//! 2. `SITE_REGISTRY`：`id=url,id=url`
//! 3. 内置默认列表

use std::env;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::site::SiteEntry;

/// 内置默认站点
const DEFAULT_SITES: &[(&str, &str)] = &[
    ("fx-trader-life", "https://fx-trader-life.com"),
    ("fx-trader-life-4line", "https://4line.fx-trader-life.com"),
    ("fx-trader-life-lp", "https://lp.fx-trader-life.com"),
    ("fx-trader-life-mfkc", "https://mfkc.fx-trader-life.com"),
    ("webmakeprofit", "https://webmakeprofit.org"),
    ("webmakeprofit-coconala", "https://coconala.webmakeprofit.org"),
    ("webmakesprofit", "https://webmakesprofit.com"),
    ("toyota-phv", "https://toyota-phv.jp"),
    ("kuma8088", "https://kuma8088.com"),
    ("kuma8088-cameramanual", "https://camera.kuma8088.com"),
    ("kuma8088-cameramanual-gwpbk492", "https://gwpbk492.kuma8088.com"),
    ("kuma8088-elementordemo1", "https://demo1.kuma8088.com"),
    ("kuma8088-elementordemo02", "https://demo2.kuma8088.com"),
    ("kuma8088-elementor-demo-03", "https://demo3.kuma8088.com"),
    ("kuma8088-elementor-demo-04", "https://demo4.kuma8088.com"),
    ("kuma8088-ec02test", "https://ec-test.kuma8088.com"),
    ("kuma8088-test", "https://test.kuma8088.com"),
];

/// 站点注册表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteRegistry {
    sites: Vec<SiteEntry>,
}

impl SiteRegistry {
    pub fn new(sites: Vec<SiteEntry>) -> Self {
        Self { sites }
    }

    /// 内置默认列表
    pub fn builtin() -> Self {
        Self::new(
            DEFAULT_SITES
                .iter()
                .map(|(id, url)| SiteEntry::new(*id, *url))
                .collect(),
        )
    }

    /// 从环境变量加载，失败时回退到内置列表
    pub fn from_env() -> Self {
        if let Ok(path) = env::var("SITE_REGISTRY_FILE") {
            match Self::from_file(Path::new(&path)) {
                Ok(registry) => {
                    info!(path = %path, sites = registry.len(), "Loaded site registry from file");
                    return registry;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to load site registry file, falling back");
                }
            }
        }

        if let Ok(raw) = env::var("SITE_REGISTRY") {
            let registry = Self::parse_pairs(&raw);
            if !registry.is_empty() {
                return registry;
            }
            warn!("SITE_REGISTRY contains no valid entries, using built-in list");
        }

        Self::builtin()
    }

    /// 读取 JSON 文件
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let sites: Vec<SiteEntry> = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self::new(sites))
    }

    /// 解析 `id=url,id=url`，跳过格式错误的项
    pub fn parse_pairs(raw: &str) -> Self {
        let sites = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|pair| {
                let (id, url) = pair.split_once('=')?;
                let (id, url) = (id.trim(), url.trim());
                if id.is_empty() || url.is_empty() {
                    warn!(entry = %pair, "Skipping malformed site registry entry");
                    return None;
                }
                Some(SiteEntry::new(id, url))
            })
            .collect();
        Self::new(sites)
    }

    pub fn sites(&self) -> &[SiteEntry] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_registry() {
        let registry = SiteRegistry::builtin();
        assert_eq!(registry.len(), 17);
        assert_eq!(registry.sites()[0].site_id, "fx-trader-life");
    }

    #[test]
    fn test_parse_pairs() {
        let registry = SiteRegistry::parse_pairs(
            "blog=https://blog.example.com, shop = https://shop.example.com ,broken,=https://x",
        );
        assert_eq!(
            registry.sites(),
            &[
                SiteEntry::new("blog", "https://blog.example.com"),
                SiteEntry::new("shop", "https://shop.example.com"),
            ]
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"site_id": "blog", "url": "https://blog.example.com"}}]"#
        )
        .unwrap();

        let registry = SiteRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.sites(), &[SiteEntry::new("blog", "https://blog.example.com")]);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(SiteRegistry::from_file(file.path()).is_err());
    }
}
