// ==========================================
// 销售订单生成系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

use crate::config::order_config_trait::OrderConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::HeaderDefaults;
use crate::importer::SheetLayout;
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const SHEET_HEADER_ROW: &str = "sheet.header_row";
    pub const SHEET_ORDER_ID_ROW: &str = "sheet.order_id_row";
    pub const SHEET_ORDER_ID_COL: &str = "sheet.order_id_col";
    pub const DEFAULT_CUSTOMER: &str = "defaults.customer";
    pub const DEFAULT_POC: &str = "defaults.poc";
    pub const DEFAULT_GST_TREATMENT: &str = "defaults.gst_treatment";

    /// 全部已知配置键
    pub const ALL: [&str; 6] = [
        SHEET_HEADER_ROW,
        SHEET_ORDER_ID_ROW,
        SHEET_ORDER_ID_COL,
        DEFAULT_CUSTOMER,
        DEFAULT_POC,
        DEFAULT_GST_TREATMENT,
    ];

    /// 行列号类配置键（正整数）
    pub const POSITIONS: [&str; 3] = [SHEET_HEADER_ROW, SHEET_ORDER_ID_ROW, SHEET_ORDER_ID_COL];
}

/// 解析行列号配置值（从 1 开始的正整数）
fn parse_position(key: &str, raw: &str) -> RepositoryResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(RepositoryError::FieldValueError {
            field: key.to_string(),
            message: format!("期望正整数，实际 {}", raw),
        }),
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let manager = Self { conn };
        {
            let conn = manager.get_conn()?;
            ensure_schema(&conn)?;
        }
        Ok(manager)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    ///
    /// 行列号类配置在写入时校验，非法值不落库
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(RepositoryError::FieldValueError {
                field: key.to_string(),
                message: "未知配置键".to_string(),
            });
        }

        let normalized;
        let value = if config_keys::POSITIONS.contains(&key) {
            normalized = parse_position(key, value)?.to_string();
            normalized.as_str()
        } else {
            value
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 列出 global scope 全部配置（按键排序）
    pub fn list_configs(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取正整数配置（行列号从 1 开始）
    fn get_position_or_default(&self, key: &str, default: usize) -> RepositoryResult<usize> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => parse_position(key, &raw),
        }
    }
}

impl OrderConfigReader for ConfigManager {
    fn get_sheet_layout(&self) -> RepositoryResult<SheetLayout> {
        let defaults = SheetLayout::default();
        Ok(SheetLayout {
            header_row: self
                .get_position_or_default(config_keys::SHEET_HEADER_ROW, defaults.header_row)?,
            order_id_row: self
                .get_position_or_default(config_keys::SHEET_ORDER_ID_ROW, defaults.order_id_row)?,
            order_id_col: self
                .get_position_or_default(config_keys::SHEET_ORDER_ID_COL, defaults.order_id_col)?,
        })
    }

    fn get_header_defaults(&self) -> RepositoryResult<HeaderDefaults> {
        let defaults = HeaderDefaults::default();
        Ok(HeaderDefaults {
            customer: self.get_config_or_default(config_keys::DEFAULT_CUSTOMER, &defaults.customer)?,
            poc: self.get_config_or_default(config_keys::DEFAULT_POC, &defaults.poc)?,
            gst_treatment: self
                .get_config_or_default(config_keys::DEFAULT_GST_TREATMENT, &defaults.gst_treatment)?,
        })
    }

    fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let configs = self.list_configs()?;
        serde_json::to_string(&configs).map_err(|e| RepositoryError::InternalError(e.to_string()))
    }
}
