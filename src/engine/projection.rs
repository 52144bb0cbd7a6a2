// ==========================================
// 宿舍分配系统 - 视图投影 (View Projection)
// ==========================================
// 纯函数: (名册, 分配矩阵, 范围, 选择状态) → 展示数据
// 每次状态变化后按需重新计算，不持有独立状态
// ==========================================
// 输出:
// - 表格行: 范围内每个房间一行
// - 剩余容量: 每列 = 范围内房间数 - 该班合格学生数 - 该列 Excluded 数（可为负，不截断）
// - 候选列表: 当前选中床位的合格学生，“排除”选项置顶
// ==========================================

use crate::domain::policy::GenderPolicy;
use crate::domain::room::RoomId;
use crate::domain::scope::ScopeKey;
use crate::domain::student::StudentId;
use crate::domain::types::Slot;
use crate::engine::eligibility::EligibilityRule;
use crate::engine::matrix::AssignmentMatrix;
use crate::engine::roster::RosterStore;
use crate::engine::selection::{SelectionState, EXCLUDE_SENTINEL};
use serde::Serialize;

/// 表格行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomRow {
    pub room_index: usize, // 矩阵下标（选中床位时回传）
    pub room_id: RoomId,
    pub room_name: String,
    pub grade: i32,
    pub year: i32,
    pub semester: i32,
    pub dorm_name: String,
    pub cells: Vec<String>, // "" / 排除标记 / 学生姓名
}

/// 每列剩余容量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnCapacity {
    pub class_no: i32,
    pub remaining: i64,
}

/// 候选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateEntry {
    pub id: StudentId,
    pub stuid: String,
    pub name: String,
}

impl CandidateEntry {
    pub fn is_exclude(&self) -> bool {
        self.id == EXCLUDE_SENTINEL
    }
}

/// 完整视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DormView {
    pub scope: ScopeKey,
    pub rows: Vec<RoomRow>,
    pub remaining: Vec<ColumnCapacity>,
    pub selection: SelectionState,
    pub candidates: Option<Vec<CandidateEntry>>, // Idle 时为 None
}

// ==========================================
// ViewProjection - 视图投影
// ==========================================
pub struct ViewProjection<'a> {
    matrix: &'a AssignmentMatrix,
    roster: &'a RosterStore,
    policy: &'a GenderPolicy,
    excluded_marker: &'a str,
}

impl<'a> ViewProjection<'a> {
    pub fn new(
        matrix: &'a AssignmentMatrix,
        roster: &'a RosterStore,
        policy: &'a GenderPolicy,
        excluded_marker: &'a str,
    ) -> Self {
        Self {
            matrix,
            roster,
            policy,
            excluded_marker,
        }
    }

    /// 生成完整视图
    pub fn project(&self, scope: &ScopeKey, selection: SelectionState) -> DormView {
        let candidates = match selection {
            SelectionState::Idle => None,
            SelectionState::Editing { slot_index, .. } => Some(self.candidates(scope, slot_index)),
        };

        DormView {
            scope: scope.clone(),
            rows: self.rows(scope),
            remaining: self.remaining_capacity(scope),
            selection,
            candidates,
        }
    }

    /// 范围内房间的表格行
    pub fn rows(&self, scope: &ScopeKey) -> Vec<RoomRow> {
        self.matrix
            .scope_filter(scope)
            .into_iter()
            .filter_map(|room_index| {
                let room = self.matrix.room(room_index)?;
                Some(RoomRow {
                    room_index,
                    room_id: room.room_id,
                    room_name: room.room_name.clone(),
                    grade: room.grade,
                    year: room.year,
                    semester: room.semester,
                    dorm_name: room.dorm_name.clone(),
                    cells: room.slots.iter().map(|slot| self.render_slot(slot)).collect(),
                })
            })
            .collect()
    }

    fn render_slot(&self, slot: &Slot) -> String {
        match slot {
            Slot::Empty => String::new(),
            Slot::Excluded => self.excluded_marker.to_string(),
            Slot::Occupied(student) => student.name.clone(),
        }
    }

    /// 每列剩余可排除名额
    ///
    /// 合格学生只看年级、班级、性别，不看是否已入住
    pub fn remaining_capacity(&self, scope: &ScopeKey) -> Vec<ColumnCapacity> {
        let rule = EligibilityRule::new(self.policy);
        let rooms_in_scope = self.matrix.scope_filter(scope).len() as i64;

        (0..self.matrix.slot_count())
            .map(|slot_index| {
                let eligible = self
                    .roster
                    .students()
                    .iter()
                    .filter(|s| rule.fits_column(s, scope, slot_index).is_ok())
                    .count() as i64;
                let excluded = self.matrix.excluded_in_column(scope, slot_index) as i64;

                ColumnCapacity {
                    class_no: slot_index as i32 + 1,
                    remaining: rooms_in_scope - eligible - excluded,
                }
            })
            .collect()
    }

    /// 指定列的候选列表（排除选项置顶）
    pub fn candidates(&self, scope: &ScopeKey, slot_index: usize) -> Vec<CandidateEntry> {
        let rule = EligibilityRule::new(self.policy);
        let placed = self.matrix.placed_ids();

        let exclude = CandidateEntry {
            id: EXCLUDE_SENTINEL,
            stuid: String::new(),
            name: self.excluded_marker.to_string(),
        };

        std::iter::once(exclude)
            .chain(
                self.roster
                    .students()
                    .iter()
                    .filter(|s| rule.check(s, scope, slot_index, &placed).is_ok())
                    .map(|s| CandidateEntry {
                        id: s.id,
                        stuid: s.stuid.clone(),
                        name: s.name.clone(),
                    }),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::RoomRecord;
    use crate::domain::student::{Student, StudentRef};
    use crate::domain::types::Gender;

    fn policy() -> GenderPolicy {
        GenderPolicy::new()
            .with_dorm("송죽관", Gender::M)
            .with_dorm("동백관", Gender::W)
    }

    fn scope() -> ScopeKey {
        ScopeKey::new(2025, 1, "송죽관", 3)
    }

    fn student(id: StudentId, class: i32, gender: Gender) -> Student {
        Student {
            id,
            name: format!("학생{}", id),
            stuid: format!("3{}{:02}", class, id),
            grade: 3,
            class,
            gender,
        }
    }

    fn room(room_id: RoomId, occupants: Vec<Option<StudentRef>>) -> RoomRecord {
        RoomRecord {
            room_id,
            room_name: format!("{}호", room_id),
            grade: 3,
            year: 2025,
            semester: 1,
            dorm_name: "송죽관".to_string(),
            occupants,
        }
    }

    #[test]
    fn test_rows_render_each_slot_state() {
        let mut matrix =
            AssignmentMatrix::initialize(vec![room(101, vec![Some(StudentRef::new(1, "학생1"))])], 4);
        matrix.set_slot(0, 1, Slot::Excluded).unwrap();
        let roster = RosterStore::load(vec![]).unwrap();
        let policy = policy();

        let rows = ViewProjection::new(&matrix, &roster, &policy, "제외").rows(&scope());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells, vec!["학생1", "제외", "", ""]);
        assert_eq!(rows[0].room_index, 0);
    }

    #[test]
    fn test_remaining_capacity_can_go_negative() {
        // 1 间房，1 班有 3 名合格学生 → 1 - 3 - 0 = -2
        let matrix = AssignmentMatrix::initialize(vec![room(101, vec![])], 4);
        let roster = RosterStore::load(vec![
            student(1, 1, Gender::M),
            student(2, 1, Gender::M),
            student(3, 1, Gender::M),
            student(4, 1, Gender::W), // 性别不符，不计入
        ])
        .unwrap();
        let policy = policy();

        let remaining = ViewProjection::new(&matrix, &roster, &policy, "제외").remaining_capacity(&scope());

        assert_eq!(remaining.len(), 4);
        assert_eq!(remaining[0], ColumnCapacity { class_no: 1, remaining: -2 });
        assert_eq!(remaining[1], ColumnCapacity { class_no: 2, remaining: 1 });
    }

    #[test]
    fn test_remaining_capacity_subtracts_excluded() {
        let mut matrix = AssignmentMatrix::initialize(vec![room(101, vec![]), room(102, vec![])], 4);
        matrix.set_slot(1, 2, Slot::Excluded).unwrap();
        let roster = RosterStore::load(vec![student(1, 3, Gender::M)]).unwrap();
        let policy = policy();

        let remaining = ViewProjection::new(&matrix, &roster, &policy, "제외").remaining_capacity(&scope());

        assert_eq!(remaining[2].remaining, 2 - 1 - 1);
    }

    #[test]
    fn test_candidates_exclude_first_and_skip_placed() {
        let matrix = AssignmentMatrix::initialize(vec![room(101, vec![Some(StudentRef::new(1, "학생1"))])], 4);
        let roster = RosterStore::load(vec![
            student(1, 1, Gender::M),
            student(2, 1, Gender::M),
            student(3, 2, Gender::M),
        ])
        .unwrap();
        let policy = policy();

        let candidates = ViewProjection::new(&matrix, &roster, &policy, "제외").candidates(&scope(), 0);

        assert!(candidates[0].is_exclude());
        let ids: Vec<StudentId> = candidates.iter().skip(1).map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_project_idle_has_no_candidates() {
        let matrix = AssignmentMatrix::initialize(vec![room(101, vec![])], 4);
        let roster = RosterStore::load(vec![]).unwrap();
        let policy = policy();

        let view = ViewProjection::new(&matrix, &roster, &policy, "제외").project(&scope(), SelectionState::Idle);
        assert!(view.candidates.is_none());

        let editing = SelectionState::Editing {
            room_index: 0,
            slot_index: 0,
        };
        let view = ViewProjection::new(&matrix, &roster, &policy, "제외").project(&scope(), editing);
        assert_eq!(view.candidates.map(|c| c.len()), Some(1));
    }
}
