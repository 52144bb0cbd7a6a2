// ==========================================
// 宿舍分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::dorm_config::{
    default_gender_policy, DormConfig, DEFAULT_EXCLUDED_MARKER, DEFAULT_SLOTS_PER_ROOM,
};
use crate::config::dorm_config_trait::DormConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

// ==========================================
// DormConfigReader Trait 实现
// ==========================================
#[async_trait]
impl DormConfigReader for ConfigManager {
    async fn get_slots_per_room(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::SLOTS_PER_ROOM,
            &DEFAULT_SLOTS_PER_ROOM.to_string(),
        )?;
        match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => {
                tracing::warn!(
                    config_key = config_keys::SLOTS_PER_ROOM,
                    raw_value = %value,
                    "床位数配置无效，使用默认值"
                );
                Ok(DEFAULT_SLOTS_PER_ROOM)
            }
        }
    }

    async fn get_gender_policy(&self) -> Result<GenderPolicy, Box<dyn Error>> {
        let value = match self.get_config_value(config_keys::GENDER_POLICY)? {
            Some(v) => v,
            None => return Ok(default_gender_policy()),
        };

        // 格式: {"송죽관": "M", "동백관": "W"}
        let policy: GenderPolicy = serde_json::from_str(&value).unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::GENDER_POLICY,
                raw_value = %value,
                "性别政策配置格式错误，使用默认配置"
            );
            default_gender_policy()
        });
        Ok(policy)
    }

    async fn get_excluded_marker(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::EXCLUDED_MARKER, DEFAULT_EXCLUDED_MARKER)
    }

    async fn get_default_scope(&self) -> Result<ScopeKey, Box<dyn Error>> {
        let fallback = DormConfig::default().default_scope;

        let year = self
            .get_config_value(config_keys::DEFAULT_YEAR)?
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(fallback.year);
        let semester = self
            .get_config_value(config_keys::DEFAULT_SEMESTER)?
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(fallback.semester);
        let dorm_name = self
            .get_config_value(config_keys::DEFAULT_DORM)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback.dorm_name);
        let grade = self
            .get_config_value(config_keys::DEFAULT_GRADE)?
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(fallback.grade);

        Ok(ScopeKey::new(year, semester, dorm_name, grade))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 房间
    pub const SLOTS_PER_ROOM: &str = "slots_per_room";
    pub const GENDER_POLICY: &str = "gender_policy"; // 宿舍楼性别政策 (JSON)

    // 视图
    pub const EXCLUDED_MARKER: &str = "excluded_marker";

    // 默认范围
    pub const DEFAULT_YEAR: &str = "default_year";
    pub const DEFAULT_SEMESTER: &str = "default_semester";
    pub const DEFAULT_DORM: &str = "default_dorm";
    pub const DEFAULT_GRADE: &str = "default_grade";
}
