//! 测试用的外部工具模拟
//!
//! 在内存中保存 kite 状态，按真实工具的输出格式应答，并记录每一次调用。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ActionError, ActionRunner};
use crate::pagekite::KiteStatus;

struct FakeState {
    installed: bool,
    running: bool,
    status: KiteStatus,
}

/// 模拟外部配置工具
pub struct FakeTool {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<Vec<String>>>,
    fail_on: Mutex<Option<(String, String)>>,
    scripted: Mutex<HashMap<String, String>>,
}

impl FakeTool {
    /// 已安装且具有给定状态的工具
    pub fn new(status: KiteStatus) -> Self {
        Self {
            state: Mutex::new(FakeState {
                installed: true,
                running: status.enabled,
                status,
            }),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
            scripted: Mutex::new(HashMap::new()),
        }
    }

    /// 未安装的工具
    pub fn not_installed() -> Self {
        let tool = Self::new(KiteStatus::default());
        tool.state.lock().unwrap().installed = false;
        tool
    }

    /// 让指定子命令输出错误信息
    pub fn fail_on(&self, subcommand: &str, stderr: &str) {
        *self.fail_on.lock().unwrap() = Some((subcommand.to_string(), stderr.to_string()));
    }

    /// 让指定子命令原样输出给定的 stdout
    pub fn script(&self, subcommand: &str, output: &str) {
        self.scripted
            .lock()
            .unwrap()
            .insert(subcommand.to_string(), output.to_string());
    }

    /// 全部调用记录
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// 除 `get-*` 查询之外的调用记录
    pub fn mutating_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| !c.first().is_some_and(|s| s.starts_with("get-")))
            .collect()
    }

    pub fn status(&self) -> KiteStatus {
        self.state.lock().unwrap().status.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn failed(stderr: &str) -> ActionError {
    ActionError::Failed {
        command: "pagekite-configure".to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl ActionRunner for FakeTool {
    async fn run(&self, args: &[String]) -> Result<String, ActionError> {
        self.calls.lock().unwrap().push(args.to_vec());

        let subcommand = args.first().map(String::as_str).unwrap_or("");
        if let Some((target, stderr)) = self.fail_on.lock().unwrap().as_ref() {
            if target == subcommand {
                return Err(failed(stderr));
            }
        }

        if let Some(output) = self.scripted.lock().unwrap().get(subcommand) {
            return Ok(output.clone());
        }

        let mut state = self.state.lock().unwrap();
        let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();

        let output = match (subcommand, rest.as_slice()) {
            ("get-installed", []) => {
                if state.installed {
                    "installed\n".to_string()
                } else {
                    "not-installed\n".to_string()
                }
            }
            ("get-status", []) => format!("{}\n", flag(state.status.enabled)),
            ("get-kite", []) => format!(
                "{}\n{}\n",
                state.status.kite_name, state.status.kite_secret
            ),
            ("get-service-status", ["http"]) => format!("{}\n", flag(state.status.http_enabled)),
            ("get-service-status", ["ssh"]) => format!("{}\n", flag(state.status.ssh_enabled)),
            ("set-status", [value]) => {
                state.status.enabled = *value == "enable";
                String::new()
            }
            ("set-kite", ["--kite-name", name, "--kite-secret", secret]) => {
                state.status.kite_name = name.to_string();
                state.status.kite_secret = secret.to_string();
                String::new()
            }
            ("set-service-status", [service, value]) => {
                let enabled = *value == "enable";
                match *service {
                    "http" => state.status.http_enabled = enabled,
                    "ssh" => state.status.ssh_enabled = enabled,
                    _ => return Err(failed("unknown service")),
                }
                String::new()
            }
            ("start", []) => {
                state.running = true;
                String::new()
            }
            ("stop", []) => {
                state.running = false;
                String::new()
            }
            _ => return Err(failed("usage: pagekite-configure <command>")),
        };

        Ok(output)
    }
}
