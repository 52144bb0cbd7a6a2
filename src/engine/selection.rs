// ==========================================
// 宿舍分配系统 - 床位选择状态机
// ==========================================
// 状态: Idle → Editing(room_index, slot_index)
// ==========================================
// 转换:
// - select_slot: 任意状态 → Editing，同时把该床位清为 Empty（重新决定）
// - assign_candidate: 仅 Editing 有效；写入 Excluded 或 Occupied，状态保持 Editing
// - clear: 范围键任一变化 → Idle（选择不跨范围保留）
// ==========================================

use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use crate::domain::student::StudentId;
use crate::domain::types::Slot;
use crate::engine::eligibility::EligibilityRule;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::matrix::AssignmentMatrix;
use crate::engine::roster::RosterStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// 候选列表中“排除”选项的ID
pub const EXCLUDE_SENTINEL: StudentId = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionState {
    #[default]
    Idle,
    Editing { room_index: usize, slot_index: usize },
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionState::Idle => write!(f, "IDLE"),
            SelectionState::Editing {
                room_index,
                slot_index,
            } => write!(f, "EDITING({}, {})", room_index, slot_index),
        }
    }
}

/// 人工选择的候选
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateChoice {
    Exclude,
    Student(StudentId),
}

impl CandidateChoice {
    /// 由候选ID解析（EXCLUDE_SENTINEL 表示排除）
    pub fn from_id(id: StudentId) -> Self {
        if id == EXCLUDE_SENTINEL {
            CandidateChoice::Exclude
        } else {
            CandidateChoice::Student(id)
        }
    }
}

// ==========================================
// SelectionMachine - 选择状态机
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// 当前选中的 (room_index, slot_index)
    pub fn selected(&self) -> Option<(usize, usize)> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Editing {
                room_index,
                slot_index,
            } => Some((room_index, slot_index)),
        }
    }

    /// 选中床位
    ///
    /// 副作用: 该床位原有内容被清为 Empty
    ///
    /// # 返回
    /// - Ok(Slot): 被清除的原值
    /// - Err(OutOfScope): 房间不属于当前范围
    /// - Err(Precondition): 下标越界
    #[instrument(skip(self, matrix, scope), fields(scope = %scope))]
    pub fn select_slot(
        &mut self,
        matrix: &mut AssignmentMatrix,
        scope: &ScopeKey,
        room_index: usize,
        slot_index: usize,
    ) -> EngineResult<Slot> {
        let room = matrix.room(room_index).ok_or_else(|| {
            EngineError::Precondition(format!("房间下标越界: room_index={}", room_index))
        })?;
        if !room.matches_scope(scope) {
            return Err(EngineError::OutOfScope {
                room_index,
                scope: scope.to_string(),
            });
        }

        let previous = matrix.set_slot(room_index, slot_index, Slot::Empty)?;
        self.state = SelectionState::Editing {
            room_index,
            slot_index,
        };

        tracing::debug!(previous = %previous, "床位已选中并清空");
        Ok(previous)
    }

    /// 为选中的床位指定候选
    ///
    /// # 返回
    /// - Ok(Slot): 写入的新值
    /// - Err(InvalidStateTransition): 未选中床位
    /// - Err(StudentNotFound): 名册中没有该学生
    /// - Err(NotEligible): 学生不符合该床位条件（含已在其他床位入住）
    #[instrument(skip(self, matrix, roster, policy, scope), fields(scope = %scope))]
    pub fn assign_candidate(
        &mut self,
        matrix: &mut AssignmentMatrix,
        roster: &RosterStore,
        policy: &GenderPolicy,
        scope: &ScopeKey,
        choice: CandidateChoice,
    ) -> EngineResult<Slot> {
        let (room_index, slot_index) = self.selected().ok_or_else(|| EngineError::InvalidStateTransition {
            from: self.state.to_string(),
            to: "ASSIGN_CANDIDATE".to_string(),
        })?;

        let value = match choice {
            CandidateChoice::Exclude => Slot::Excluded,
            CandidateChoice::Student(student_id) => {
                let student = roster
                    .find(student_id)
                    .ok_or(EngineError::StudentNotFound(student_id))?;

                // 当前床位自身的占用者不算“已入住”（允许重复指定同一人）
                let mut placed = matrix.placed_ids();
                if let Some(current) = matrix.slot(room_index, slot_index).and_then(Slot::occupant) {
                    placed.remove(&current.id);
                }

                EligibilityRule::new(policy)
                    .check(student, scope, slot_index, &placed)
                    .map_err(|reason| EngineError::NotEligible {
                        student_id,
                        room_index,
                        slot_index,
                        reason: reason.to_string(),
                    })?;

                Slot::Occupied(student.to_ref())
            }
        };

        matrix.set_slot(room_index, slot_index, value.clone())?;
        tracing::debug!(room_index, slot_index, value = %value, "床位已指定");
        Ok(value)
    }

    /// 回到 Idle（范围变化时调用）
    pub fn clear(&mut self) {
        self.state = SelectionState::Idle;
    }
}
