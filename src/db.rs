// ==========================================
// 宿舍分配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout
// - 提供建表脚本（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 默认数据库文件名
pub const DEFAULT_DB_FILE_NAME: &str = "dorm_assign.db";

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

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（所有语句均为 IF NOT EXISTS，可重复执行）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS student (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            stuid TEXT NOT NULL,
            grade INTEGER NOT NULL,
            class INTEGER NOT NULL,
            gender TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dorm_room (
            room_id INTEGER PRIMARY KEY,
            room_name TEXT NOT NULL,
            grade INTEGER NOT NULL,
            year INTEGER NOT NULL,
            semester INTEGER NOT NULL,
            dorm_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dorm_room_member (
            room_id INTEGER NOT NULL REFERENCES dorm_room(room_id) ON DELETE CASCADE,
            slot_no INTEGER NOT NULL,
            student_id INTEGER NOT NULL REFERENCES student(id),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (room_id, slot_no)
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 默认数据库路径: <data_dir>/dorm-assign/dorm_assign.db
///
/// 获取不到系统数据目录时退回当前目录
pub fn get_default_db_path() -> String {
    let base = dirs::data_dir()
        .map(|dir| dir.join("dorm-assign"))
        .unwrap_or_else(|| PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&base) {
        tracing::warn!("无法创建数据目录 {}: {}", base.display(), e);
        return DEFAULT_DB_FILE_NAME.to_string();
    }

    base.join(DEFAULT_DB_FILE_NAME).to_string_lossy().to_string()
}
