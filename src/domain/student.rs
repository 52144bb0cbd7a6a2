// ==========================================
// 宿舍分配系统 - 学生领域模型
// ==========================================
// 用途: 名册数据，加载后只读
// 对齐: student 表
// ==========================================

use crate::domain::types::Gender;
use serde::{Deserialize, Serialize};

/// 学生ID
pub type StudentId = i64;

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,    // 学生唯一标识
    pub name: String,     // 姓名
    pub stuid: String,    // 学号（显示用）
    pub grade: i32,       // 年级
    pub class: i32,       // 班级（1..K，决定可入住的床位列）
    pub gender: Gender,   // 性别（决定可入住的宿舍楼）
}

impl Student {
    /// 生成床位引用
    pub fn to_ref(&self) -> StudentRef {
        StudentRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// 该学生对应的床位列下标（class - 1）
    pub fn slot_index(&self) -> Option<usize> {
        self.class.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}

// ==========================================
// StudentRef - 床位中的学生引用
// ==========================================
// 身份以 id 为准；name 仅用于展示（可能来自房间数据而非名册）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub id: StudentId,
    pub name: String,
}

impl StudentRef {
    pub fn new(id: StudentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_in_class(class: i32) -> Student {
        Student {
            id: 1,
            name: "학생1".to_string(),
            stuid: "3101".to_string(),
            grade: 3,
            class,
            gender: Gender::M,
        }
    }

    #[test]
    fn test_slot_index_follows_class() {
        assert_eq!(student_in_class(1).slot_index(), Some(0));
        assert_eq!(student_in_class(4).slot_index(), Some(3));
    }

    #[test]
    fn test_slot_index_rejects_out_of_range_class() {
        assert_eq!(student_in_class(0).slot_index(), None);
        assert_eq!(student_in_class(-3).slot_index(), None);
        assert_eq!(student_in_class(i32::MIN).slot_index(), None);
    }
}
