// ==========================================
// 宿舍分配系统 - 加载/保存协作方 Trait
// ==========================================
// 职责: 定义引擎边界上的三个外部接口（不包含业务逻辑）
// 实现者: SqliteDormRepository（使用 rusqlite）；测试中可替换为内存实现
// ==========================================

use crate::domain::assignment::RoomAssignmentPayload;
use crate::domain::room::RoomRecord;
use crate::domain::student::Student;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// DormRoomSource - 房间快照来源
// ==========================================
#[async_trait]
pub trait DormRoomSource: Send + Sync {
    /// 加载全部房间（含各床位当前入住学生）
    ///
    /// # 返回
    /// - Ok(Vec<RoomRecord>): 房间快照，occupants 按床位顺序排列
    /// - Err: 读取失败
    async fn load_rooms(&self) -> RepositoryResult<Vec<RoomRecord>>;
}

// ==========================================
// StudentRosterSource - 学生名册来源
// ==========================================
#[async_trait]
pub trait StudentRosterSource: Send + Sync {
    /// 加载全部学生
    async fn load_students(&self) -> RepositoryResult<Vec<Student>>;
}

// ==========================================
// DormAssignmentSink - 分配结果写入方
// ==========================================
#[async_trait]
pub trait DormAssignmentSink: Send + Sync {
    /// 保存房间分配（单次写入，失败不重试）
    ///
    /// # 返回
    /// - Ok(usize): 写入的房间数
    /// - Err: 写入失败（整体回滚）
    async fn save_assignments(&self, payload: &[RoomAssignmentPayload]) -> RepositoryResult<usize>;
}
