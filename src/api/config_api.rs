// ==========================================
// 销售订单生成系统 - 配置管理 API
// ==========================================
// 职责: 配置查询与更新（global scope）
// ==========================================

use crate::api::error::ApiResult;
use crate::config::{config_keys, ConfigManager};
use crate::db::open_sqlite_connection;
use crate::repository::RepositoryError;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// 配置项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    /// 数据库中的值（未设置时为 None，使用内置缺省值）
    pub value: Option<String>,
}

pub struct ConfigApi {
    config_manager: ConfigManager,
}

impl ConfigApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        Ok(Self {
            config_manager: ConfigManager::from_connection(conn)?,
        })
    }

    /// 列出全部已知配置键及其当前值
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let stored = self.config_manager.list_configs()?;
        Ok(config_keys::ALL
            .iter()
            .map(|key| ConfigItem {
                key: key.to_string(),
                value: stored.get(*key).cloned(),
            })
            .collect())
    }

    /// 更新配置（未知键或非法行列号报错）
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        self.config_manager.set_config_value(key, value)?;
        info!(key, value, "配置已更新");
        Ok(())
    }
}
