//! 命令执行器
//!
//! 所有采集器都通过这里调用外部进程（docker、df 等）：
//! - 超时控制（超时后子进程随 future 一起被 kill）
//! - stdout/stderr 分离
//! - 非零退出码转换为 `CommandError::Failed`

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// 命令执行错误
#[derive(Debug)]
pub enum CommandError {
    /// 命令启动失败
    SpawnFailed(std::io::Error),
    /// 命令超时
    Timeout(Duration),
    /// 命令以非零退出码结束
    Failed {
        code: Option<i32>,
        stderr: String,
    },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::SpawnFailed(e) => write!(f, "Failed to spawn command: {}", e),
            CommandError::Timeout(d) => write!(f, "Command timed out after {}s", d.as_secs()),
            CommandError::Failed { code, stderr } => match code {
                Some(code) => write!(f, "Command failed with exit code {}: {}", code, stderr),
                None => write!(f, "Command terminated by signal: {}", stderr),
            },
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::SpawnFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// 成功执行后的输出
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// 外部命令执行接口
///
/// 采集器只依赖这个 trait，测试里可以替换成脚本化的假实现
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// 执行命令，返回 stdout 与 stderr；`work_dir` 为空时继承当前目录
    async fn output(
        &self,
        program: &str,
        args: &[&str],
        work_dir: Option<&Path>,
    ) -> Result<CommandOutput, CommandError>;

    /// 执行命令，返回去掉尾部空白的 stdout
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let output = self.output(program, args, None).await?;
        Ok(output.stdout.trim_end().to_string())
    }
}

/// 基于 tokio::process 的命令执行器
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for CommandRunner {
    async fn output(
        &self,
        program: &str,
        args: &[&str],
        work_dir: Option<&Path>,
    ) -> Result<CommandOutput, CommandError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = work_dir {
            cmd.current_dir(dir);
        }

        debug!(program = %program, args = ?args, "Running command");

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(CommandError::SpawnFailed)?,
            Err(_) => {
                warn!(program = %program, args = ?args, timeout = ?self.timeout, "Command timed out");
                return Err(CommandError::Timeout(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(CommandError::Failed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
