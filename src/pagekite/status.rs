//! 从外部工具读取当前状态

use super::{KiteService, KiteStatus};
use crate::actions::{argv, ActionRunner};
use crate::error::AppError;

/// 输出中的第一个单词
fn first_token(output: &str) -> &str {
    output.split_whitespace().next().unwrap_or("")
}

fn is_enabled(output: &str) -> bool {
    first_token(output) == "enabled"
}

/// 通过一系列查询命令获取当前 PageKite 配置
///
/// 外部工具未安装时返回 `None`
pub async fn get_status(runner: &dyn ActionRunner) -> Result<Option<KiteStatus>, AppError> {
    let output = runner.run(&argv(["get-installed"])).await?;
    tracing::debug!(output = %output.trim(), "get-installed");
    if first_token(&output) != "installed" {
        return Ok(None);
    }

    let mut status = KiteStatus {
        enabled: is_enabled(&runner.run(&argv(["get-status"])).await?),
        ..KiteStatus::default()
    };

    let output = runner.run(&argv(["get-kite"])).await?;
    let mut kite_details = output.split_whitespace();
    status.kite_name = kite_details.next().unwrap_or_default().to_string();
    status.kite_secret = kite_details.next().unwrap_or_default().to_string();

    for service in KiteService::ALL {
        let output = runner
            .run(&argv(["get-service-status", service.as_str()]))
            .await?;
        status.set_service_enabled(service, is_enabled(&output));
    }

    Ok(Some(status))
}
