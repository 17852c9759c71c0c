// ==========================================
// 销售订单生成系统 - 批次日志仓储
// ==========================================
// 职责: 每处理一个订单文件追加一条批次记录（审计用）
// 红线: 不触碰参考表
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 批次日志实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLogEntity {
    pub batch_id: String,                     // 批次ID (UUID)
    pub file_name: Option<String>,            // 源文件名
    pub order_id: String,                     // 订单/项目号
    pub total_rows: usize,                    // 数据行数
    pub success_lines: usize,                 // Success 表行数
    pub failed_rows: usize,                   // Failed 表行数
    pub elapsed_ms: u64,                      // 处理耗时
    pub processed_at: DateTime<Utc>,          // 处理完成时间
    pub config_snapshot_json: Option<String>, // 处理时配置快照
}

pub struct BatchLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchLogRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        {
            let conn = repo.get_conn()?;
            ensure_schema(&conn)?;
        }
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, entity: &BatchLogEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO batch_log (
                batch_id,
                file_name,
                order_id,
                total_rows,
                success_lines,
                failed_rows,
                elapsed_ms,
                processed_at,
                config_snapshot_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                entity.batch_id,
                entity.file_name,
                entity.order_id,
                entity.total_rows as i64,
                entity.success_lines as i64,
                entity.failed_rows as i64,
                entity.elapsed_ms as i64,
                entity.processed_at.to_rfc3339(),
                entity.config_snapshot_json,
            ],
        )?;
        Ok(())
    }

    /// 最近的批次记录（按处理时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<BatchLogEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, order_id, total_rows, success_lines,
                   failed_rows, elapsed_ms, processed_at, config_snapshot_json
            FROM batch_log
            ORDER BY processed_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let processed_at: String = row.get(7)?;
            let processed_at = DateTime::parse_from_rfc3339(&processed_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;

            Ok(BatchLogEntity {
                batch_id: row.get(0)?,
                file_name: row.get(1)?,
                order_id: row.get(2)?,
                total_rows: row.get::<_, i64>(3)? as usize,
                success_lines: row.get::<_, i64>(4)? as usize,
                failed_rows: row.get::<_, i64>(5)? as usize,
                elapsed_ms: row.get::<_, i64>(6)? as u64,
                processed_at,
                config_snapshot_json: row.get(8)?,
            })
        })?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(row?);
        }
        Ok(entities)
    }
}
