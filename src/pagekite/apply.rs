//! 新旧配置比对与应用
//!
//! 有任何变更时：先 `stop`，再逐项调用对应子命令，最后 `start`。

use super::{KiteService, KiteStatus, Message};
use crate::actions::{argv, ActionRunner};
use crate::error::AppError;

/// 变更计划
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePlan {
    /// 按顺序执行的外部工具参数
    pub commands: Vec<Vec<String>>,
    /// 全部执行成功后展示的消息
    pub messages: Vec<Message>,
}

impl ChangePlan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn switch(enabled: bool) -> &'static str {
    if enabled {
        "enable"
    } else {
        "disable"
    }
}

/// 根据新旧状态生成变更计划
pub fn plan_changes(old: &KiteStatus, new: &KiteStatus) -> ChangePlan {
    let mut plan = ChangePlan::default();

    if old == new {
        return plan;
    }

    plan.commands.push(argv(["stop"]));

    if old.enabled != new.enabled {
        plan.commands.push(argv(["set-status", switch(new.enabled)]));
        plan.messages.push(Message::success(if new.enabled {
            "PageKite enabled"
        } else {
            "PageKite disabled"
        }));
    }

    if old.kite_name != new.kite_name || old.kite_secret != new.kite_secret {
        plan.commands.push(argv([
            "set-kite",
            "--kite-name",
            new.kite_name.as_str(),
            "--kite-secret",
            new.kite_secret.as_str(),
        ]));
        plan.messages.push(Message::success("Kite details set"));
    }

    for service in KiteService::ALL {
        let enabled = new.service_enabled(service);
        if old.service_enabled(service) == enabled {
            continue;
        }

        plan.commands
            .push(argv(["set-service-status", service.as_str(), switch(enabled)]));
        plan.messages.push(Message::success(if enabled {
            format!("Service enabled: {}", service)
        } else {
            format!("Service disabled: {}", service)
        }));
    }

    plan.commands.push(argv(["start"]));
    plan
}

/// 应用配置变更
///
/// 任何一步失败都会立即返回错误，不重试也不回滚
pub async fn apply_changes(
    runner: &dyn ActionRunner,
    old: &KiteStatus,
    new: &KiteStatus,
) -> Result<Vec<Message>, AppError> {
    tracing::info!(new_status = ?new, "Applying PageKite configuration");

    let plan = plan_changes(old, new);
    if plan.is_empty() {
        tracing::debug!("Configuration unchanged");
        return Ok(plan.messages);
    }

    for command in &plan.commands {
        runner.run(command).await?;
    }

    Ok(plan.messages)
}
