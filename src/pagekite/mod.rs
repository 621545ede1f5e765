//! PageKite 配置模块
//!
//! 读取外部工具中的 kite 状态，比对新旧配置，并按变更逐项调用外部工具。

mod apply;
mod form;
mod status;

pub use apply::{apply_changes, plan_changes, ChangePlan};
pub use form::{ConfigureForm, FormErrors, FORM_PREFIX};
pub use status::get_status;

use serde::{Deserialize, Serialize};
use std::fmt;

/// kite 状态
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KiteStatus {
    pub enabled: bool,
    pub kite_name: String,
    pub kite_secret: String,
    pub http_enabled: bool,
    pub ssh_enabled: bool,
}

impl KiteStatus {
    /// 指定子服务是否启用
    pub fn service_enabled(&self, service: KiteService) -> bool {
        match service {
            KiteService::Http => self.http_enabled,
            KiteService::Ssh => self.ssh_enabled,
        }
    }

    pub fn set_service_enabled(&mut self, service: KiteService, enabled: bool) {
        match service {
            KiteService::Http => self.http_enabled = enabled,
            KiteService::Ssh => self.ssh_enabled = enabled,
        }
    }
}

// 日志中不输出 secret
impl fmt::Debug for KiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KiteStatus")
            .field("enabled", &self.enabled)
            .field("kite_name", &self.kite_name)
            .field("kite_secret", &"****")
            .field("http_enabled", &self.http_enabled)
            .field("ssh_enabled", &self.ssh_enabled)
            .finish()
    }
}

/// 通过 kite 暴露的子服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KiteService {
    Http,
    Ssh,
}

impl KiteService {
    /// 固定的处理顺序
    pub const ALL: [KiteService; 2] = [KiteService::Http, KiteService::Ssh];

    pub fn as_str(&self) -> &'static str {
        match self {
            KiteService::Http => "http",
            KiteService::Ssh => "ssh",
        }
    }
}

impl fmt::Display for KiteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提示消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Error => "error",
        }
    }
}

/// 页面提示消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}
