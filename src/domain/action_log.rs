// ==========================================
// 宿舍分配系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // 日志ID (uuid v4)
    pub action_type: String,             // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,        // 操作时间戳
    pub actor: String,                   // 操作人
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

impl ActionLog {
    /// 以当前时间创建日志
    pub fn new(action_type: ActionType, actor: impl Into<String>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.into(),
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    SaveAssignment, // 保存房间分配
    ImportStudents, // 导入名册
    ImportRooms,    // 导入房间
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::SaveAssignment => write!(f, "SAVE_ASSIGNMENT"),
            ActionType::ImportStudents => write!(f, "IMPORT_STUDENTS"),
            ActionType::ImportRooms => write!(f, "IMPORT_ROOMS"),
        }
    }
}
