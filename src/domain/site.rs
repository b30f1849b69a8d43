//! WordPress 站点领域模型

use serde::{Deserialize, Serialize};

use crate::domain::format::two_decimals;

/// 站点注册表中的一项
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SiteEntry {
    /// 站点标识，同时是安装目录名
    pub site_id: String,
    pub url: String,
}

impl SiteEntry {
    pub fn new(site_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            url: url.into(),
        }
    }
}

/// 站点探测结果
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SiteState {
    /// 探测命令成功执行
    Running,
    /// 探测失败
    Unknown,
}

/// 站点状态
#[derive(Clone, Debug, Serialize)]
pub struct SiteStatus {
    pub site_name: String,
    pub url: String,
    pub status: SiteState,
    pub redis_connected: bool,
    #[serde(serialize_with = "two_decimals")]
    pub cache_hit_rate: f64,
}

impl SiteStatus {
    /// 探测失败时的状态
    pub fn unknown(site: &SiteEntry) -> Self {
        Self {
            site_name: site.site_id.clone(),
            url: site.url.clone(),
            status: SiteState::Unknown,
            redis_connected: false,
            cache_hit_rate: 0.0,
        }
    }
}
