//! 领域模型模块
//!
//! 纯数据结构与纯函数，不依赖 axum/tokio

pub mod backup;
pub mod cache;
pub mod container;
pub mod format;
pub mod overview;
pub mod site;
pub mod system;

// Re-exports for convenience
pub use backup::{BackupDateLabel, BackupEntry, BackupOrigin, BackupStats, BackupTier};
pub use cache::CacheStats;
pub use container::{ContainerStatus, ContainerSummary, LiveStats, StatusFilter};
pub use overview::DashboardOverview;
pub use site::{SiteEntry, SiteState, SiteStatus};
pub use system::HostMetrics;
