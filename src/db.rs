// ==========================================
// 销售订单生成系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一建表（参考表 / 配置表 / 批次日志表）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SO_GEN_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 参考表允许重复键，查询时按 id 升序取第一条
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS cabinets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cabinet_code TEXT NOT NULL,
            bom_line_1 TEXT,
            bom_line_2 TEXT,
            bom_line_3 TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_cabinets_code ON cabinets(cabinet_code);

        CREATE TABLE IF NOT EXISTS colorcode (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            colour_name TEXT NOT NULL,
            colour_code TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_colorcode_name ON colorcode(colour_name);

        CREATE TABLE IF NOT EXISTS code_raw (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            infurnia_code TEXT NOT NULL,
            odoo_code TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_code_raw_infurnia ON code_raw(infurnia_code);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS batch_log (
            batch_id TEXT PRIMARY KEY,
            file_name TEXT,
            order_id TEXT NOT NULL,
            total_rows INTEGER NOT NULL,
            success_lines INTEGER NOT NULL,
            failed_rows INTEGER NOT NULL,
            elapsed_ms INTEGER NOT NULL,
            processed_at TEXT NOT NULL,
            config_snapshot_json TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_batch_log_processed_at
            ON batch_log(processed_at DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径
///
/// 优先级: SO_GEN_DB_PATH → 用户数据目录/so-generation/so_generation.db → ./so_generation.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./so_generation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("so-generation");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("so_generation.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
