//! 服务层模块
//!
//! 每个采集器负责一类运行数据，返回类型化的快照

pub mod backup;
pub mod cache;
pub mod containers;
pub mod host;
pub mod overview;
pub mod sites;

use std::sync::Arc;

use crate::config::{EnvConfig, SiteRegistry};
use crate::domain::container::ContainerSummary;
use crate::infra::{CommandExecutor, DockerCli};

pub use crate::error::CollectError;
pub use backup::BackupCollector;
pub use cache::CacheCollector;
pub use containers::ContainerCollector;
pub use host::HostCollector;
pub use sites::SiteCollector;

/// 全部采集器
///
/// 共享同一个命令执行器，启动时构建一次
#[derive(Clone)]
pub struct Collectors {
    pub host: HostCollector,
    pub containers: ContainerCollector,
    pub cache: CacheCollector,
    pub sites: SiteCollector,
    pub backup: BackupCollector,
    /// 仪表盘容器分区只展示带此前缀的容器
    dashboard_prefix: Option<String>,
}

impl Collectors {
    pub fn new(config: &EnvConfig, registry: SiteRegistry, exec: Arc<dyn CommandExecutor>) -> Self {
        let docker = DockerCli::new(exec.clone(), config.docker_bin.clone());

        Self {
            host: HostCollector::new(config.proc_root.clone(), config.disk_mount.clone(), exec),
            containers: ContainerCollector::new(docker.clone(), config.probe_concurrency),
            cache: CacheCollector::new(docker.clone(), config.redis.clone()),
            sites: SiteCollector::new(
                docker,
                config.wordpress.clone(),
                registry,
                config.probe_concurrency,
            ),
            backup: BackupCollector::new(config.backup.clone()),
            dashboard_prefix: config.dashboard_container_prefix.clone(),
        }
    }

    /// 仪表盘容器分区：按前缀过滤，不按状态过滤
    pub async fn dashboard_containers(&self) -> Result<Vec<ContainerSummary>, CollectError> {
        self.containers
            .list(None, self.dashboard_prefix.as_deref())
            .await
    }
}
