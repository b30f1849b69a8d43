//! 测试用的脚本化命令执行器

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::infra::command::{CommandError, CommandExecutor, CommandOutput};

/// 预设的命令应答
#[derive(Debug, Clone)]
pub enum Reply {
    Stdout(String),
    Streams(String, String),
    Fail(String),
    Timeout,
}

/// 按命令行前缀匹配应答的执行器
///
/// 第一条前缀匹配的规则生效；没有匹配时返回失败
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &str, reply: Reply) -> Self {
        self.rules.push((prefix.to_string(), reply));
        self
    }

    pub fn stdout(self, prefix: &str, stdout: &str) -> Self {
        self.on(prefix, Reply::Stdout(stdout.to_string()))
    }

    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.on(prefix, Reply::Fail(stderr.to_string()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn output(
        &self,
        program: &str,
        args: &[&str],
        _work_dir: Option<&Path>,
    ) -> Result<CommandOutput, CommandError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let reply = self
            .rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Stdout(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Some(Reply::Streams(stdout, stderr)) => Ok(CommandOutput { stdout, stderr }),
            Some(Reply::Fail(stderr)) => Err(CommandError::Failed {
                code: Some(1),
                stderr,
            }),
            Some(Reply::Timeout) => Err(CommandError::Timeout(std::time::Duration::from_secs(30))),
            None => Err(CommandError::Failed {
                code: Some(127),
                stderr: format!("unexpected command: {}", line),
            }),
        }
    }
}
