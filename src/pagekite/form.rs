//! PageKite 配置表单
//!
//! 字段名带 `pagekite-` 前缀，复选框未勾选时不会出现在提交内容中。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::KiteStatus;

/// 表单字段前缀
pub const FORM_PREFIX: &str = "pagekite";

/// kite 名称：以点分隔的若干段，每段 1-63 个单词字符或连字符
static KITE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w-]{1,63}(\.[\w-]{1,63})*$").expect("valid kite name regex"));

const REQUIRED: &str = "This field is required.";

/// 提交的表单内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureForm {
    #[serde(rename = "pagekite-enabled", default)]
    pub enabled: Option<String>,
    #[serde(rename = "pagekite-kite_name", default)]
    pub kite_name: Option<String>,
    #[serde(rename = "pagekite-kite_secret", default)]
    pub kite_secret: Option<String>,
    #[serde(rename = "pagekite-http_enabled", default)]
    pub http_enabled: Option<String>,
    #[serde(rename = "pagekite-ssh_enabled", default)]
    pub ssh_enabled: Option<String>,
}

/// 表单校验错误：字段名 -> 错误信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn checkbox(value: &Option<String>) -> bool {
    match value.as_deref() {
        None => false,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "false" | "off" | "0"),
    }
}

fn checked(enabled: bool) -> Option<String> {
    enabled.then(|| "on".to_string())
}

/// 去除首尾空白并检查必填
fn required_trimmed(value: &Option<String>, field: &str, errors: &mut FormErrors) -> String {
    let trimmed = value.as_deref().unwrap_or("").trim().to_string();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
    }
    trimmed
}

impl ConfigureForm {
    /// 以当前状态作为初始值
    pub fn from_status(status: &KiteStatus) -> Self {
        Self {
            enabled: checked(status.enabled),
            kite_name: Some(status.kite_name.clone()),
            kite_secret: Some(status.kite_secret.clone()),
            http_enabled: checked(status.http_enabled),
            ssh_enabled: checked(status.ssh_enabled),
        }
    }

    pub fn is_checked(&self, field: &str) -> bool {
        match field {
            "enabled" => checkbox(&self.enabled),
            "http_enabled" => checkbox(&self.http_enabled),
            "ssh_enabled" => checkbox(&self.ssh_enabled),
            _ => false,
        }
    }

    /// 文本字段的回显值（已去除首尾空白）
    pub fn text(&self, field: &str) -> &str {
        let value = match field {
            "kite_name" => &self.kite_name,
            "kite_secret" => &self.kite_secret,
            _ => return "",
        };
        value.as_deref().unwrap_or("").trim()
    }

    /// 校验表单并转换为新状态
    pub fn clean(&self) -> Result<KiteStatus, FormErrors> {
        let mut errors = FormErrors::default();

        let kite_name = required_trimmed(&self.kite_name, "kite_name", &mut errors);
        if !kite_name.is_empty() && !KITE_NAME_RE.is_match(&kite_name) {
            errors.add("kite_name", "Invalid kite name");
        }

        let kite_secret = required_trimmed(&self.kite_secret, "kite_secret", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(KiteStatus {
            enabled: checkbox(&self.enabled),
            kite_name,
            kite_secret,
            http_enabled: checkbox(&self.http_enabled),
            ssh_enabled: checkbox(&self.ssh_enabled),
        })
    }
}
