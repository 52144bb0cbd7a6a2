// ==========================================
// 宿舍分配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: Precondition / DuplicatePlacement 代表调用方缺陷，不可恢复
// ==========================================

use crate::domain::student::StudentId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 选择状态机 =====
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("学生不存在: id={0}")]
    StudentNotFound(StudentId),

    #[error("学生不符合床位条件: student_id={student_id}, room_index={room_index}, slot_index={slot_index}, reason={reason}")]
    NotEligible {
        student_id: StudentId,
        room_index: usize,
        slot_index: usize,
        reason: String,
    },

    #[error("房间不在当前范围内: room_index={room_index}, scope={scope}")]
    OutOfScope { room_index: usize, scope: String },

    // ===== 名册 =====
    #[error("名册数据无效: {0}")]
    InvalidRoster(String),

    // ===== 不变量违反（调用方缺陷）=====
    #[error("前置条件违反: {0}")]
    Precondition(String),

    #[error("学生重复入住: student_id={student_id}, rooms={first_room}/{second_room}")]
    DuplicatePlacement {
        student_id: StudentId,
        first_room: usize,
        second_room: usize,
    },
}

impl EngineError {
    /// 是否为不变量违反（调用方缺陷）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Precondition(_) | EngineError::DuplicatePlacement { .. }
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
