//! 外部配置工具调用模块
//!
//! 所有 kite 状态都保存在外部工具中，面板只负责以子进程方式调用它。
//! `ActionRunner` trait 用于解耦调用方与实际的子进程执行，便于测试替换。

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;

use crate::config::PanelConfig;

#[cfg(test)]
mod fake;
#[cfg(test)]
pub use fake::FakeTool;

/// 外部工具调用错误
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("failed to run {command}: {reason}")]
    Spawn { command: String, reason: String },
    #[error("{stderr}")]
    Failed { command: String, stderr: String },
    #[error("action timed out after {0}s")]
    Timeout(u64),
}

/// 外部工具调用 trait
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// 以给定参数调用外部工具，返回标准输出
    ///
    /// 只要标准错误输出非空即视为失败
    async fn run(&self, args: &[String]) -> Result<String, ActionError>;
}

/// 共享的 ActionRunner 类型别名
pub type SharedActionRunner = Arc<dyn ActionRunner>;

/// 基于子进程的 ActionRunner 实现
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: String,
    superuser: bool,
    superuser_prefix: Vec<String>,
    timeout_secs: u64,
}

impl CommandRunner {
    /// 创建新的 CommandRunner
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            superuser: false,
            superuser_prefix: Vec::new(),
            timeout_secs: 30,
        }
    }

    /// 从面板配置创建
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            command: config.action_command.clone(),
            superuser: config.superuser,
            superuser_prefix: config.superuser_prefix.clone(),
            timeout_secs: config.action_timeout_secs,
        }
    }

    /// 设置提权方式
    pub fn with_superuser(mut self, prefix: Vec<String>) -> Self {
        self.superuser = true;
        self.superuser_prefix = prefix;
        self
    }

    /// 设置超时时间
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 组装完整命令行 (program, args)
    fn command_line(&self, args: &[String]) -> (String, Vec<String>) {
        let mut full_args = Vec::with_capacity(args.len() + self.superuser_prefix.len() + 1);

        let program = match self.superuser_prefix.split_first() {
            Some((program, prefix_args)) if self.superuser => {
                full_args.extend(prefix_args.iter().cloned());
                full_args.push(self.command.clone());
                program.clone()
            }
            _ => self.command.clone(),
        };

        full_args.extend(args.iter().cloned());
        (program, full_args)
    }
}

#[async_trait]
impl ActionRunner for CommandRunner {
    async fn run(&self, args: &[String]) -> Result<String, ActionError> {
        tracing::info!(
            command = %self.command,
            args = ?redact_args(args),
            superuser = self.superuser,
            "Running command"
        );

        let (program, full_args) = self.command_line(args);

        let mut cmd = Command::new(&program);
        cmd.args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), cmd.output())
            .await
            .map_err(|_| ActionError::Timeout(self.timeout_secs))?
            .map_err(|e| ActionError::Spawn {
                command: program.clone(),
                reason: e.to_string(),
            })?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(command = %self.command, stderr = %stderr.trim(), "Command reported an error");
            return Err(ActionError::Failed {
                command: self.command.clone(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(command = %self.command, output = %stdout.trim(), "Command finished");
        Ok(stdout)
    }
}

/// 日志中隐藏 `--kite-secret` 之后的参数
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut hide_next = false;

    for arg in args {
        if hide_next {
            redacted.push("****".to_string());
            hide_next = false;
            continue;
        }
        hide_next = arg == "--kite-secret";
        redacted.push(arg.clone());
    }

    redacted
}

/// 便捷构造参数列表
pub fn argv<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_plain() {
        let runner = CommandRunner::new("pagekite-configure");
        let (program, full) = runner.command_line(&argv(["get-status"]));
        assert_eq!(program, "pagekite-configure");
        assert_eq!(full, vec!["get-status"]);
    }

    #[test]
    fn test_command_line_superuser() {
        let runner = CommandRunner::new("pagekite-configure")
            .with_superuser(vec!["sudo".to_string(), "-n".to_string()]);
        let (program, full) = runner.command_line(&argv(["set-status", "enable"]));
        assert_eq!(program, "sudo");
        assert_eq!(full, vec!["-n", "pagekite-configure", "set-status", "enable"]);
    }

    #[test]
    fn test_command_line_superuser_without_prefix_runs_directly() {
        let runner = CommandRunner::new("pagekite-configure").with_superuser(Vec::new());
        let (program, full) = runner.command_line(&argv(["start"]));
        assert_eq!(program, "pagekite-configure");
        assert_eq!(full, vec!["start"]);
    }

    #[test]
    fn test_from_config() {
        let config = PanelConfig {
            action_command: "/usr/share/plinth/actions/pagekite-configure".to_string(),
            superuser: false,
            ..PanelConfig::default()
        };
        let runner = CommandRunner::from_config(&config);
        let (program, _) = runner.command_line(&[]);
        assert_eq!(program, "/usr/share/plinth/actions/pagekite-configure");
    }

    #[test]
    fn test_redact_args_hides_secret() {
        let redacted = redact_args(&argv([
            "set-kite",
            "--kite-name",
            "box.pagekite.me",
            "--kite-secret",
            "hunter2",
        ]));
        assert_eq!(
            redacted,
            vec!["set-kite", "--kite-name", "box.pagekite.me", "--kite-secret", "****"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_returns_stdout() {
        let runner = CommandRunner::new("echo");
        let output = runner.run(&argv(["installed"])).await.unwrap();
        assert_eq!(output.trim(), "installed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_fails_on_stderr_output() {
        let runner = CommandRunner::new("sh");
        let result = runner
            .run(&argv(["-c", "echo partial; echo boom >&2"]))
            .await;

        match result {
            Err(ActionError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_fails_on_whitespace_only_stderr() {
        let runner = CommandRunner::new("sh");
        let result = runner.run(&argv(["-c", "echo ok; echo >&2"])).await;

        match result {
            Err(ActionError::Failed { stderr, .. }) => assert_eq!(stderr, ""),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_ignores_exit_status_without_stderr() {
        let runner = CommandRunner::new("sh");
        let output = runner.run(&argv(["-c", "echo done; exit 3"])).await.unwrap();
        assert_eq!(output.trim(), "done");
    }

    #[tokio::test]
    async fn test_run_missing_binary() {
        let runner = CommandRunner::new("kite-panel-definitely-missing-binary");
        let result = runner.run(&argv(["get-status"])).await;
        assert!(matches!(result, Err(ActionError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout() {
        let runner = CommandRunner::new("sleep").with_timeout(1);
        let result = runner.run(&argv(["5"])).await;
        assert!(matches!(result, Err(ActionError::Timeout(1))));
    }
}
