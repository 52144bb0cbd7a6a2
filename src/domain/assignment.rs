// ==========================================
// 宿舍分配系统 - 保存负载
// ==========================================
// 用途: 提交给持久化协作方的房间分配数据
// 范围: 仅当前 (年度, 学期, 宿舍楼)
// ==========================================

use crate::domain::room::{Room, RoomId};
use crate::domain::student::StudentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAssignmentPayload {
    pub room_id: RoomId,
    pub year: i32,
    pub semester: i32,
    pub users: Vec<Option<StudentId>>, // Empty 与 Excluded 均为 null
}

impl From<&Room> for RoomAssignmentPayload {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id,
            year: room.year,
            semester: room.semester,
            users: room.slots.iter().map(|slot| slot.to_persisted_id()).collect(),
        }
    }
}
