// ==========================================
// 销售订单生成系统 - Odoo 连接配置
// ==========================================
// 来源: 环境变量（不在代码或数据库中保存凭据）
// - ODOO_URL / ODOO_DB / ODOO_USERNAME / ODOO_PASSWORD（必填）
// - ODOO_TIMEOUT_SECS（可选，默认 30）
// ==========================================

use std::time::Duration;
use thiserror::Error;

pub const ENV_URL: &str = "ODOO_URL";
pub const ENV_DB: &str = "ODOO_DB";
pub const ENV_USERNAME: &str = "ODOO_USERNAME";
pub const ENV_PASSWORD: &str = "ODOO_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "ODOO_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("缺少环境变量: {0}")]
    MissingEnv(String),

    #[error("环境变量格式错误 ({key}={value})")]
    InvalidValue { key: String, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct OdooSettings {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

// 不输出密码
impl std::fmt::Debug for OdooSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooSettings")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OdooSettings {
    /// 从环境变量读取
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SettingsError::MissingEnv(key.to_string()))
        };

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| SettingsError::InvalidValue {
                    key: ENV_TIMEOUT_SECS.to_string(),
                    value: raw.clone(),
                })?,
        };

        Ok(Self {
            url: required(ENV_URL)?.trim_end_matches('/').to_string(),
            database: required(ENV_DB)?,
            username: required(ENV_USERNAME)?,
            password: required(ENV_PASSWORD)?,
            timeout,
        })
    }
}
