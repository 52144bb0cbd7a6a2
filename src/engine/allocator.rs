// ==========================================
// 宿舍分配系统 - 随机分配引擎 (Allocator)
// ==========================================
// 职责: 用符合条件的学生随机填充当前范围内的 Empty 床位
// 输入: 分配矩阵 + 名册 + 性别政策 + 范围 + 随机源
// 输出: 更新后的分配矩阵 + AllocationReport
// ==========================================
// 红线:
// - 只写 Empty 床位；Occupied / Excluded 一律不动
// - 不触碰范围外的房间
// - 同一学生只能被抽中一次
// - 候选不足不是错误：床位保持 Empty
// ==========================================

use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use crate::domain::student::Student;
use crate::domain::types::Slot;
use crate::engine::eligibility::EligibilityRule;
use crate::engine::error::EngineResult;
use crate::engine::matrix::AssignmentMatrix;
use crate::engine::roster::RosterStore;
use rand::Rng;
use serde::Serialize;
use tracing::instrument;

/// 单次随机分配的结果统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    pub rooms_in_scope: usize,            // 范围内房间数
    pub pool_size: usize,                 // 候选池大小（年级+性别，未入住）
    pub attempted: usize,                 // 尝试填充的 Empty 床位数
    pub filled: usize,                    // 成功填充数
    pub unfilled_by_column: Vec<usize>,   // 每列仍为 Empty 的床位数
}

impl AllocationReport {
    pub fn unfilled(&self) -> usize {
        self.attempted - self.filled
    }

    /// 是否所有尝试的床位都已填满
    pub fn is_complete(&self) -> bool {
        self.filled == self.attempted
    }
}

// ==========================================
// RoomAllocator - 随机分配引擎
// ==========================================
pub struct RoomAllocator {
    // 无状态引擎，随机源由调用方注入
}

impl RoomAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 填充当前范围内的全部 Empty 床位
    ///
    /// 规则:
    /// 1) 候选池: 年级匹配、性别符合宿舍楼政策、且未在任何房间入住（跨范围）
    /// 2) 候选池按班级分组（班级 = 床位下标 + 1）
    /// 3) 按房间顺序、床位顺序遍历；遇 Empty 则从对应班级中均匀随机抽取一人
    /// 4) 抽中的学生从候选池移除；对应班级已空则该床位保持 Empty
    ///
    /// # 参数
    /// - `rng`: 随机源（测试中使用 `StdRng::seed_from_u64` 保证可复现）
    #[instrument(skip(self, matrix, roster, policy, scope, rng), fields(scope = %scope))]
    pub fn allocate<R: Rng>(
        &self,
        matrix: &mut AssignmentMatrix,
        roster: &RosterStore,
        policy: &GenderPolicy,
        scope: &ScopeKey,
        rng: &mut R,
    ) -> EngineResult<AllocationReport> {
        let slot_count = matrix.slot_count();
        let rule = EligibilityRule::new(policy);

        // 1. 候选池（跨范围排除已入住学生）
        let placed = matrix.placed_ids();
        let pool: Vec<&Student> = roster
            .students()
            .iter()
            .filter(|s| rule.admits(s, scope).is_ok())
            .filter(|s| !placed.contains(&s.id))
            .collect();
        let pool_size = pool.len();

        // 2. 按班级分组；班级超出床位数的学生永远不会被抽到
        let mut by_column: Vec<Vec<&Student>> = vec![Vec::new(); slot_count];
        for student in pool {
            if let Some(bucket) = student.slot_index().and_then(|i| by_column.get_mut(i)) {
                bucket.push(student);
            }
        }

        // 3. 逐房间逐床位填充
        let room_indices = matrix.scope_filter(scope);
        let mut attempted = 0;
        let mut filled = 0;
        let mut unfilled_by_column = vec![0; slot_count];

        for &room_index in &room_indices {
            for slot_index in 0..slot_count {
                if !matrix.slot(room_index, slot_index).is_some_and(Slot::is_empty) {
                    continue;
                }
                attempted += 1;

                let bucket = &mut by_column[slot_index];
                if bucket.is_empty() {
                    unfilled_by_column[slot_index] += 1;
                    continue;
                }

                let drawn = bucket.remove(rng.gen_range(0..bucket.len()));
                matrix.set_slot(room_index, slot_index, Slot::Occupied(drawn.to_ref()))?;
                filled += 1;

                tracing::trace!(
                    room_index,
                    slot_index,
                    student_id = drawn.id,
                    "床位已分配"
                );
            }
        }

        let report = AllocationReport {
            rooms_in_scope: room_indices.len(),
            pool_size,
            attempted,
            filled,
            unfilled_by_column,
        };

        tracing::info!(
            rooms = report.rooms_in_scope,
            pool = report.pool_size,
            attempted = report.attempted,
            filled = report.filled,
            "随机分配完成"
        );
        if !report.is_complete() {
            tracing::debug!(unfilled = ?report.unfilled_by_column, "候选不足，部分床位保持为空");
        }

        Ok(report)
    }
}

impl Default for RoomAllocator {
    fn default() -> Self {
        Self::new()
    }
}
