// ==========================================
// 宿舍分配系统 - 房间领域模型
// ==========================================
// RoomRecord: 加载快照（不可变，用于重置）
// Room: 分配矩阵中的可变房间（定长床位）
// ==========================================

use crate::domain::scope::ScopeKey;
use crate::domain::student::StudentRef;
use crate::domain::types::Slot;
use serde::{Deserialize, Serialize};

/// 房间ID
pub type RoomId = i64;

// ==========================================
// RoomRecord - 加载时的房间记录
// ==========================================
// occupants 按床位顺序排列，长度不保证等于床位数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room_id: RoomId,
    pub room_name: String,
    pub grade: i32,
    pub year: i32,
    pub semester: i32,
    pub dorm_name: String,
    pub occupants: Vec<Option<StudentRef>>,
}

// ==========================================
// Room - 分配矩阵中的房间
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub room_name: String,
    pub grade: i32,
    pub year: i32,
    pub semester: i32,
    pub dorm_name: String,
    pub slots: Vec<Slot>,
}

impl Room {
    /// 由加载记录整形为定长床位
    ///
    /// 缺失位置补 Empty，多余位置截断
    pub fn from_record(record: &RoomRecord, slot_count: usize) -> Self {
        let slots = (0..slot_count)
            .map(|i| match record.occupants.get(i) {
                Some(Some(student)) => Slot::Occupied(student.clone()),
                _ => Slot::Empty,
            })
            .collect();

        Self {
            room_id: record.room_id,
            room_name: record.room_name.clone(),
            grade: record.grade,
            year: record.year,
            semester: record.semester,
            dorm_name: record.dorm_name.clone(),
            slots,
        }
    }

    /// 调整床位数（保留低位下标的内容）
    pub fn resize(&mut self, slot_count: usize) {
        self.slots.resize(slot_count, Slot::Empty);
    }

    /// 是否属于指定范围（年级、年度、学期、宿舍楼全部匹配）
    pub fn matches_scope(&self, scope: &ScopeKey) -> bool {
        self.grade == scope.grade && self.matches_dorm_scope(scope)
    }

    /// 是否属于指定的 (年度, 学期, 宿舍楼)，不看年级
    pub fn matches_dorm_scope(&self, scope: &ScopeKey) -> bool {
        self.year == scope.year && self.semester == scope.semester && self.dorm_name == scope.dorm_name
    }
}
