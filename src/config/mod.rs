//! 配置模块
//!
//! 环境变量解析与站点注册表加载

pub mod env;
pub mod sites;

pub use env::{BackupConfig, EnvConfig, RedisConfig, WordPressConfig};
pub use sites::SiteRegistry;
