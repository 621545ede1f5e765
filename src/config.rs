//! 面板配置模块
//!
//! 管理端口、外部配置工具命令等设置，支持从配置文件读取和保存。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 默认端口号
pub const DEFAULT_PORT: u16 = 19840;

/// 默认外部配置工具
pub const DEFAULT_ACTION_COMMAND: &str = "pagekite-configure";

/// 配置文件名
const CONFIG_FILENAME: &str = "settings.yaml";

/// 配置目录环境变量
pub const CONFIG_DIR_ENV: &str = "KITE_PANEL_CONFIG_DIR";

/// 面板配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// 面板监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 外部配置工具
    #[serde(default = "default_action_command")]
    pub action_command: String,
    /// 是否以 root 权限运行外部工具
    #[serde(default = "default_superuser")]
    pub superuser: bool,
    /// 提权命令前缀
    #[serde(default = "default_superuser_prefix")]
    pub superuser_prefix: Vec<String>,
    /// 单次调用超时（秒）
    #[serde(default = "default_action_timeout")]
    pub action_timeout_secs: u64,
    /// 访问令牌，设置后所有页面需要 `?token=`
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_action_command() -> String {
    DEFAULT_ACTION_COMMAND.to_string()
}

fn default_superuser() -> bool {
    true
}

fn default_superuser_prefix() -> Vec<String> {
    vec!["sudo".to_string(), "-n".to_string()]
}

fn default_action_timeout() -> u64 {
    30
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            action_command: default_action_command(),
            superuser: default_superuser(),
            superuser_prefix: default_superuser_prefix(),
            action_timeout_secs: default_action_timeout(),
            access_token: None,
        }
    }
}

impl PanelConfig {
    /// 从配置目录加载配置
    ///
    /// # Arguments
    /// * `config_dir` - 配置目录路径
    ///
    /// # Returns
    /// 配置对象，如果文件不存在或无法解析则返回默认配置
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %config_path.display(), error = %e, "Invalid settings file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// 保存配置到配置目录
    pub fn save(&self, config_dir: &Path) -> Result<(), AppError> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    /// 验证端口是否有效
    ///
    /// 端口必须在 1024-65535 范围内
    pub fn validate_port(port: u16) -> Result<(), AppError> {
        if port < 1024 {
            return Err(AppError::Validation(
                "Port must be >= 1024 (non-privileged ports)".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取配置文件的完整路径
    pub fn get_config_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILENAME)
    }

    /// 解析配置目录：环境变量优先，其次系统配置目录
    pub fn resolve_config_dir() -> Result<PathBuf, AppError> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        dirs::config_dir()
            .map(|d| d.join("kite-panel"))
            .ok_or_else(|| AppError::Config("Failed to determine config directory".to_string()))
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = PanelConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.action_command, "pagekite-configure");
        assert!(config.superuser);
        assert_eq!(config.superuser_prefix, vec!["sudo", "-n"]);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_load_nonexistent_config() {
        let dir = tempdir().unwrap();
        let config = PanelConfig::load(dir.path());
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let config = PanelConfig {
            port: 12345,
            superuser: false,
            access_token: Some("s3cret".to_string()),
            ..PanelConfig::default()
        };

        config.save(dir.path()).unwrap();

        let loaded = PanelConfig::load(dir.path());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        PanelConfig::default().save(&nested).unwrap();
        assert!(PanelConfig::get_config_path(&nested).exists());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "port: 20000\n").unwrap();

        let config = PanelConfig::load(dir.path());
        assert_eq!(config.port, 20000);
        assert_eq!(config.action_command, DEFAULT_ACTION_COMMAND);
        assert_eq!(config.action_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "port: [not a number").unwrap();

        let config = PanelConfig::load(dir.path());
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_validate_port() {
        assert!(PanelConfig::validate_port(1024).is_ok());
        assert!(PanelConfig::validate_port(DEFAULT_PORT).is_ok());
        assert!(PanelConfig::validate_port(65535).is_ok());
        assert!(PanelConfig::validate_port(1023).is_err());
        assert!(PanelConfig::validate_port(80).is_err());
    }
}
