//! 基础设施模块
//!
//! 封装外部依赖（命令执行、docker CLI）

pub mod command;
pub mod docker;

#[cfg(test)]
pub mod testing;

pub use command::{CommandError, CommandExecutor, CommandOutput, CommandRunner};
pub use docker::DockerCli;
