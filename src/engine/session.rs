// ==========================================
// 宿舍分配系统 - 分配会话编排器
// ==========================================
// 用途: 持有名册、分配矩阵、选择状态机与当前范围，协调各引擎
// 单一调用方，同步执行；异步只存在于加载/保存边界（见 api 层）
// ==========================================
// 范围变化规则:
// - (年度, 学期, 宿舍楼) 任一变化 → 矩阵从快照重建 + 选择回到 Idle
// - 仅年级变化 → 选择回到 Idle（矩阵保留）
// ==========================================

use crate::config::DormConfig;
use crate::domain::assignment::RoomAssignmentPayload;
use crate::domain::room::RoomRecord;
use crate::domain::scope::ScopeKey;
use crate::domain::student::{Student, StudentId};
use crate::domain::types::Slot;
use crate::engine::allocator::{AllocationReport, RoomAllocator};
use crate::engine::error::EngineResult;
use crate::engine::matrix::AssignmentMatrix;
use crate::engine::projection::{DormView, ViewProjection};
use crate::engine::roster::RosterStore;
use crate::engine::selection::{CandidateChoice, SelectionMachine, SelectionState};
use rand::Rng;
use tracing::{info, instrument, warn};

// ==========================================
// DormSession - 分配会话
// ==========================================
#[derive(Debug, Clone)]
pub struct DormSession {
    config: DormConfig,
    roster: RosterStore,
    matrix: AssignmentMatrix,
    selection: SelectionMachine,
    allocation_runs: u64,
    scope: ScopeKey,
}

impl DormSession {
    /// 由加载结果构建会话
    ///
    /// # 参数
    /// - config: 分配配置（床位数、性别政策、默认范围）
    /// - rooms: 房间快照
    /// - students: 学生名册
    ///
    /// # 返回
    /// - Err(InvalidRoster): 学生ID重复
    /// - Err(DuplicatePlacement): 快照中同一学生占用多个床位
    pub fn new(config: DormConfig, rooms: Vec<RoomRecord>, students: Vec<Student>) -> EngineResult<Self> {
        let roster = RosterStore::load(students)?;
        let matrix = AssignmentMatrix::initialize(rooms, config.slots_per_room);

        if let Err(e) = matrix.verify_unique() {
            warn!(error = %e, "房间快照中存在重复入住记录，拒绝加载");
            return Err(e);
        }

        info!(
            rooms = matrix.len(),
            students = roster.len(),
            slots_per_room = config.slots_per_room,
            "分配会话已初始化"
        );

        Ok(Self {
            scope: config.default_scope.clone(),
            config,
            roster,
            matrix,
            selection: SelectionMachine::new(),
            allocation_runs: 0,
        })
    }

    // ==========================================
    // 范围
    // ==========================================

    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    /// 切换范围
    #[instrument(skip(self, scope), fields(from = %self.scope, to = %scope))]
    pub fn set_scope(&mut self, scope: ScopeKey) {
        if scope == self.scope {
            return;
        }

        if !scope.same_dorm_scope(&self.scope) {
            self.matrix.reset();
            info!("宿舍范围变化，分配矩阵已从快照重建");
        }
        self.selection.clear();
        self.scope = scope;
    }

    pub fn set_year(&mut self, year: i32) {
        self.set_scope(ScopeKey { year, ..self.scope.clone() });
    }

    pub fn set_semester(&mut self, semester: i32) {
        self.set_scope(ScopeKey {
            semester,
            ..self.scope.clone()
        });
    }

    pub fn set_dorm(&mut self, dorm_name: impl Into<String>) {
        self.set_scope(ScopeKey {
            dorm_name: dorm_name.into(),
            ..self.scope.clone()
        });
    }

    pub fn set_grade(&mut self, grade: i32) {
        self.set_scope(ScopeKey {
            grade,
            ..self.scope.clone()
        });
    }

    // ==========================================
    // 人工编辑
    // ==========================================

    /// 选中床位（原内容清为 Empty）
    pub fn select_slot(&mut self, room_index: usize, slot_index: usize) -> EngineResult<Slot> {
        self.selection
            .select_slot(&mut self.matrix, &self.scope, room_index, slot_index)
    }

    /// 为选中床位指定候选（EXCLUDE_SENTINEL 表示排除）
    pub fn assign_candidate(&mut self, candidate_id: StudentId) -> EngineResult<Slot> {
        self.checked_write(|session| {
            session.selection.assign_candidate(
                &mut session.matrix,
                &session.roster,
                &session.config.gender_policy,
                &session.scope,
                CandidateChoice::from_id(candidate_id),
            )
        })
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    // ==========================================
    // 批量操作
    // ==========================================

    /// 随机填充当前范围内的 Empty 床位
    pub fn allocate<R: Rng>(&mut self, rng: &mut R) -> EngineResult<AllocationReport> {
        let report = self.checked_write(|session| {
            RoomAllocator::new().allocate(
                &mut session.matrix,
                &session.roster,
                &session.config.gender_policy,
                &session.scope,
                rng,
            )
        })?;
        self.allocation_runs += 1;
        Ok(report)
    }

    /// 丢弃全部修改，恢复最近一次加载的快照
    ///
    /// 选择状态不变：Editing 时选中床位恢复为快照中的值
    pub fn reset(&mut self) {
        self.matrix.reset();
        info!(scope = %self.scope, "分配矩阵已重置");
    }

    /// 应用新配置；床位数变化时按新床位数整形矩阵（低位床位保留）
    pub fn apply_config(&mut self, config: DormConfig) {
        if config.slots_per_room != self.config.slots_per_room {
            info!(
                from = self.config.slots_per_room,
                to = config.slots_per_room,
                "床位数变化，分配矩阵已整形"
            );
            self.matrix.resize(config.slots_per_room);
            if let SelectionState::Editing { slot_index, .. } = self.selection.state() {
                if slot_index >= config.slots_per_room {
                    self.selection.clear();
                }
            }
        }
        self.config = config;
    }

    /// 已执行的随机分配次数
    pub fn allocation_runs(&self) -> u64 {
        self.allocation_runs
    }

    // ==========================================
    // 输出
    // ==========================================

    /// 当前范围的视图
    pub fn view(&self) -> DormView {
        ViewProjection::new(
            &self.matrix,
            &self.roster,
            &self.config.gender_policy,
            &self.config.excluded_marker,
        )
        .project(&self.scope, self.selection.state())
    }

    /// 保存负载: 当前 (年度, 学期, 宿舍楼) 的全部房间（不按年级过滤）
    pub fn save_payload(&self) -> Vec<RoomAssignmentPayload> {
        self.matrix
            .dorm_scope_rooms(&self.scope)
            .map(RoomAssignmentPayload::from)
            .collect()
    }

    pub fn matrix(&self) -> &AssignmentMatrix {
        &self.matrix
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn config(&self) -> &DormConfig {
        &self.config
    }

    /// 执行写操作；唯一性被破坏时回滚矩阵并返回错误
    fn checked_write<T>(&mut self, write: impl FnOnce(&mut Self) -> EngineResult<T>) -> EngineResult<T> {
        let checkpoint = self.matrix.clone();
        let result = write(self).and_then(|value| self.matrix.verify_unique().map(|()| value));
        if let Err(e) = &result {
            if e.is_fatal() {
                tracing::error!(error = %e, "分配矩阵不变量被破坏，已回滚");
            }
            self.matrix = checkpoint;
        }
        result
    }
}
