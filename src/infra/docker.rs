//! Docker CLI 封装
//!
//! 所有对 docker 命令的调用以及错误文本的分类都集中在这里

use std::sync::Arc;

use crate::error::CollectError;
use crate::infra::command::{CommandError, CommandExecutor, CommandOutput};

/// docker 报告资源不存在时 stderr 中出现的片段
///
/// docker CLI 对“不存在”与其他失败使用相同的退出码 1，只能靠文本区分
const NOT_FOUND_MARKERS: &[&str] = &["no such container", "no such object"];

/// Docker CLI 客户端
#[derive(Clone)]
pub struct DockerCli {
    exec: Arc<dyn CommandExecutor>,
    bin: String,
}

impl DockerCli {
    pub fn new(exec: Arc<dyn CommandExecutor>, bin: impl Into<String>) -> Self {
        Self {
            exec,
            bin: bin.into(),
        }
    }

    /// 执行 docker 子命令，返回去掉尾部空白的 stdout
    pub async fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        self.exec.run(&self.bin, args).await
    }

    /// 执行 docker 子命令，返回完整的 stdout/stderr
    pub async fn output(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.exec.output(&self.bin, args, None).await
    }

    /// 在容器内执行命令（`docker exec`）
    pub async fn exec_in(&self, container: &str, command: &[&str]) -> Result<String, CommandError> {
        let mut args = vec!["exec", "-i", container];
        args.extend_from_slice(command);
        self.run(&args).await
    }
}

/// stderr 是否表示资源不存在
pub fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m))
}

/// 将针对某个容器的命令失败翻译为采集错误
///
/// 唯一做“不存在”文本匹配的地方
pub fn classify_failure(err: CommandError, resource: &str) -> CollectError {
    match err {
        CommandError::Failed { ref stderr, .. } if is_not_found(stderr) => {
            CollectError::NotFound(resource.to_string())
        }
        other => CollectError::from(other),
    }
}
