// ==========================================
// 宿舍分配系统 - 分配矩阵 (Assignment Matrix)
// ==========================================
// 职责: 房间 × 床位 的可变网格（房间竞技场，按下标寻址）
// 快照: 加载时的房间列表单独保存且永不修改，供重置使用
// ==========================================
// 红线:
// - 同一学生在整个矩阵中至多占一个床位
// - 写入不做唯一性检查；唯一性是派生属性（由 verify_unique 检测）
// ==========================================

use crate::domain::room::{Room, RoomRecord};
use crate::domain::scope::ScopeKey;
use crate::domain::student::StudentId;
use crate::domain::types::Slot;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AssignmentMatrix {
    snapshot: Arc<[RoomRecord]>,
    rooms: Vec<Room>,
    slot_count: usize,
}

impl AssignmentMatrix {
    /// 由加载的房间列表构建矩阵
    ///
    /// 每个房间整形为 slot_count 个床位（缺失补 Empty，多余截断）
    pub fn initialize(snapshot: Vec<RoomRecord>, slot_count: usize) -> Self {
        let snapshot: Arc<[RoomRecord]> = snapshot.into();
        let rooms = reshape(&snapshot, slot_count);
        Self {
            snapshot,
            rooms,
            slot_count,
        }
    }

    /// 从快照恢复全部房间（丢弃人工与随机分配的修改）
    pub fn reset(&mut self) {
        self.rooms = reshape(&self.snapshot, self.slot_count);
    }

    /// 覆写单个床位，返回原值
    ///
    /// 不做唯一性检查。下标越界属于调用方缺陷。
    pub fn set_slot(&mut self, room_index: usize, slot_index: usize, value: Slot) -> EngineResult<Slot> {
        let slot_count = self.slot_count;
        let room = self.rooms.get_mut(room_index).ok_or_else(|| {
            EngineError::Precondition(format!("房间下标越界: room_index={}", room_index))
        })?;
        let slot = room.slots.get_mut(slot_index).ok_or_else(|| {
            EngineError::Precondition(format!(
                "床位下标越界: slot_index={}, slot_count={}",
                slot_index, slot_count
            ))
        })?;
        Ok(std::mem::replace(slot, value))
    }

    pub fn slot(&self, room_index: usize, slot_index: usize) -> Option<&Slot> {
        self.rooms.get(room_index)?.slots.get(slot_index)
    }

    /// 调整床位数；保留低位下标内容，之后的重置也按新床位数整形
    pub fn resize(&mut self, slot_count: usize) {
        self.slot_count = slot_count;
        for room in &mut self.rooms {
            room.resize(slot_count);
        }
    }

    /// 属于指定范围的房间下标（保持矩阵原有顺序）
    pub fn scope_filter(&self, scope: &ScopeKey) -> Vec<usize> {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.matches_scope(scope))
            .map(|(i, _)| i)
            .collect()
    }

    /// 属于指定 (年度, 学期, 宿舍楼) 的房间（不看年级）
    pub fn dorm_scope_rooms<'a>(&'a self, scope: &'a ScopeKey) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter(move |room| room.matches_dorm_scope(scope))
    }

    /// 已入住学生ID集合（跨全部范围）
    pub fn placed_ids(&self) -> HashSet<StudentId> {
        self.rooms
            .iter()
            .flat_map(|room| room.slots.iter())
            .filter_map(|slot| slot.occupant().map(|s| s.id))
            .collect()
    }

    /// 指定范围内某列的 Excluded 床位数
    pub fn excluded_in_column(&self, scope: &ScopeKey, slot_index: usize) -> usize {
        self.rooms
            .iter()
            .filter(|room| room.matches_scope(scope))
            .filter(|room| room.slots.get(slot_index).is_some_and(Slot::is_excluded))
            .count()
    }

    /// 检查学生唯一性
    ///
    /// # 返回
    /// - Err(DuplicatePlacement): 同一学生出现在两个床位
    pub fn verify_unique(&self) -> EngineResult<()> {
        let mut seen: HashMap<StudentId, usize> = HashMap::new();
        for (room_index, room) in self.rooms.iter().enumerate() {
            for student in room.slots.iter().filter_map(Slot::occupant) {
                if let Some(first_room) = seen.insert(student.id, room_index) {
                    return Err(EngineError::DuplicatePlacement {
                        student_id: student.id,
                        first_room,
                        second_room: room_index,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_index: usize) -> Option<&Room> {
        self.rooms.get(room_index)
    }

    pub fn snapshot(&self) -> &[RoomRecord] {
        &self.snapshot
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

fn reshape(snapshot: &[RoomRecord], slot_count: usize) -> Vec<Room> {
    snapshot
        .iter()
        .map(|record| Room::from_record(record, slot_count))
        .collect()
}
