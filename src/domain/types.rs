// ==========================================
// 宿舍分配系统 - 领域类型定义
// ==========================================
// 职责: 性别、床位状态等基础枚举
// ==========================================

use crate::domain::student::StudentRef;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 性别 (Gender)
// ==========================================
// 决定学生可入住的宿舍楼
// 序列化格式: "M" / "W" (与名册数据一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M, // 男
    W, // 女
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::M => write!(f, "M"),
            Gender::W => write!(f, "W"),
        }
    }
}

impl Gender {
    /// 从字符串解析性别（无法识别时返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "남" => Some(Gender::M),
            "W" | "F" | "FEMALE" | "여" => Some(Gender::W),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::W => "W",
        }
    }
}

// ==========================================
// 床位状态 (Slot)
// ==========================================
// 三态: 空 / 已入住 / 排除
// 红线: Excluded 是人工终态决定，随机分配不得覆盖
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "student", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Slot {
    #[default]
    Empty,
    Occupied(StudentRef),
    Excluded,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Slot::Excluded)
    }

    /// 入住学生（仅 Occupied 时返回）
    pub fn occupant(&self) -> Option<&StudentRef> {
        match self {
            Slot::Occupied(student) => Some(student),
            _ => None,
        }
    }

    /// 持久化取值: 学生ID 或 NULL
    ///
    /// Empty 与 Excluded 均落为 NULL，重新加载后无法区分。
    pub fn to_persisted_id(&self) -> Option<i64> {
        self.occupant().map(|s| s.id)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => write!(f, "EMPTY"),
            Slot::Occupied(student) => write!(f, "OCCUPIED({})", student.id),
            Slot::Excluded => write!(f, "EXCLUDED"),
        }
    }
}
