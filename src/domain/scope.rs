// ==========================================
// 宿舍分配系统 - 范围键 (Scope Key)
// ==========================================
// (年度, 学期, 宿舍楼, 年级)：所有筛选与分配的作用范围
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    pub year: i32,
    pub semester: i32,
    pub dorm_name: String,
    pub grade: i32,
}

impl ScopeKey {
    pub fn new(year: i32, semester: i32, dorm_name: impl Into<String>, grade: i32) -> Self {
        Self {
            year,
            semester,
            dorm_name: dorm_name.into(),
            grade,
        }
    }

    /// (年度, 学期, 宿舍楼) 是否相同
    ///
    /// 三者任一变化都会触发分配矩阵重建；仅年级变化不会。
    pub fn same_dorm_scope(&self, other: &ScopeKey) -> bool {
        self.year == other.year && self.semester == other.semester && self.dorm_name == other.dorm_name
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} grade={}",
            self.year, self.semester, self.dorm_name, self.grade
        )
    }
}
