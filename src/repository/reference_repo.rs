// ==========================================
// 销售订单生成系统 - 参考数据仓储
// ==========================================
// 职责: cabinets / colorcode / code_raw 三张表的查询与批量加载
// 说明: 订单处理只走 LookupGateway 只读接口；批量加载仅供运维命令使用，清空与写入同属一个事务
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::{CabinetRecord, CodeMapping, ColourRecord};
use crate::perf::{record_lookup, LookupTable};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::lookup_gateway::LookupGateway;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::info;

/// 参考表行数统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReferenceCounts {
    pub cabinets: usize,
    pub colours: usize,
    pub code_mappings: usize,
}

/// 一次参考数据加载（未提供的表保持不变）
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceLoad<'a> {
    pub replace: bool,
    pub cabinets: Option<&'a [CabinetRecord]>,
    pub colours: Option<&'a [ColourRecord]>,
    pub code_mappings: Option<&'a [CodeMapping]>,
}

fn tx_error(stage: &str, err: rusqlite::Error) -> RepositoryError {
    RepositoryError::DatabaseTransactionError(format!("{}: {}", stage, err))
}

fn write_cabinets(tx: &Transaction<'_>, records: &[CabinetRecord]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO cabinets (cabinet_code, bom_line_1, bom_line_2, bom_line_3)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for r in records {
        let [b1, b2, b3] = &r.bom_lines;
        stmt.execute(params![r.cabinet_code, b1, b2, b3])?;
    }
    Ok(())
}

fn write_colours(tx: &Transaction<'_>, records: &[ColourRecord]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare("INSERT INTO colorcode (colour_name, colour_code) VALUES (?1, ?2)")?;
    for r in records {
        stmt.execute(params![r.colour_name, r.colour_code])?;
    }
    Ok(())
}

fn write_code_mappings(tx: &Transaction<'_>, records: &[CodeMapping]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare("INSERT INTO code_raw (infurnia_code, odoo_code) VALUES (?1, ?2)")?;
    for r in records {
        stmt.execute(params![r.infurnia_code, r.odoo_code])?;
    }
    Ok(())
}

pub struct ReferenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceRepository {
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

    // ==========================================
    // 批量加载
    // ==========================================

    /// 追加柜体 BOM 记录（单事务）
    pub fn insert_cabinets(&self, records: &[CabinetRecord]) -> RepositoryResult<usize> {
        self.load_all(&ReferenceLoad {
            cabinets: Some(records),
            ..Default::default()
        })?;
        Ok(records.len())
    }

    /// 追加颜色码记录（单事务）
    pub fn insert_colours(&self, records: &[ColourRecord]) -> RepositoryResult<usize> {
        self.load_all(&ReferenceLoad {
            colours: Some(records),
            ..Default::default()
        })?;
        Ok(records.len())
    }

    /// 追加型号映射记录（单事务）
    pub fn insert_code_mappings(&self, records: &[CodeMapping]) -> RepositoryResult<usize> {
        self.load_all(&ReferenceLoad {
            code_mappings: Some(records),
            ..Default::default()
        })?;
        Ok(records.len())
    }

    /// 清空三张参考表
    pub fn clear_all(&self) -> RepositoryResult<()> {
        self.load_all(&ReferenceLoad {
            replace: true,
            ..Default::default()
        })
    }

    /// 在同一事务内完成（可选）清空与全部写入
    ///
    /// 任一语句失败则整体回滚，参考表保持加载前状态
    pub fn load_all(&self, load: &ReferenceLoad<'_>) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if load.replace {
            tx.execute_batch("DELETE FROM cabinets; DELETE FROM colorcode; DELETE FROM code_raw;")
                .map_err(|e| tx_error("clear", e))?;
        }
        if let Some(records) = load.cabinets {
            write_cabinets(&tx, records).map_err(|e| tx_error("cabinets", e))?;
        }
        if let Some(records) = load.colours {
            write_colours(&tx, records).map_err(|e| tx_error("colorcode", e))?;
        }
        if let Some(records) = load.code_mappings {
            write_code_mappings(&tx, records).map_err(|e| tx_error("code_raw", e))?;
        }

        tx.commit().map_err(|e| tx_error("commit", e))?;
        info!(
            replace = load.replace,
            cabinets = load.cabinets.map_or(0, <[_]>::len),
            colours = load.colours.map_or(0, <[_]>::len),
            code_mappings = load.code_mappings.map_or(0, <[_]>::len),
            "参考表写入完成"
        );
        Ok(())
    }

    /// 各参考表行数
    pub fn counts(&self) -> RepositoryResult<ReferenceCounts> {
        let conn = self.get_conn()?;
        let count = |table: &str| -> RepositoryResult<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(ReferenceCounts {
            cabinets: count("cabinets")?,
            colours: count("colorcode")?,
            code_mappings: count("code_raw")?,
        })
    }
}

impl LookupGateway for ReferenceRepository {
    fn find_cabinet(&self, cabinet_code: &str) -> RepositoryResult<Option<CabinetRecord>> {
        let conn = self.get_conn()?;
        let start = Instant::now();
        let record = conn
            .query_row(
                r#"
                SELECT cabinet_code, bom_line_1, bom_line_2, bom_line_3
                FROM cabinets
                WHERE cabinet_code = ?1
                ORDER BY id
                LIMIT 1
                "#,
                params![cabinet_code],
                |row| {
                    Ok(CabinetRecord {
                        cabinet_code: row.get(0)?,
                        bom_lines: [row.get(1)?, row.get(2)?, row.get(3)?],
                    })
                },
            )
            .optional()?;
        record_lookup(LookupTable::Cabinets, start.elapsed());
        Ok(record)
    }

    fn find_colour(&self, colour_name: &str) -> RepositoryResult<Option<ColourRecord>> {
        let conn = self.get_conn()?;
        let start = Instant::now();
        let record = conn
            .query_row(
                r#"
                SELECT colour_name, colour_code
                FROM colorcode
                WHERE colour_name = ?1
                ORDER BY id
                LIMIT 1
                "#,
                params![colour_name],
                |row| {
                    Ok(ColourRecord {
                        colour_name: row.get(0)?,
                        colour_code: row.get(1)?,
                    })
                },
            )
            .optional()?;
        record_lookup(LookupTable::Colours, start.elapsed());
        Ok(record)
    }

    fn find_mapped_code(&self, model_code: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let start = Instant::now();
        let code = conn
            .query_row(
                r#"
                SELECT odoo_code
                FROM code_raw
                WHERE infurnia_code = ?1
                ORDER BY id
                LIMIT 1
                "#,
                params![model_code],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        record_lookup(LookupTable::CodeMap, start.elapsed());
        Ok(code)
    }
}
