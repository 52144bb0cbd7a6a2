// ==========================================
// 宿舍分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod assignment;
pub mod policy;
pub mod room;
pub mod scope;
pub mod student;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use assignment::RoomAssignmentPayload;
pub use policy::GenderPolicy;
pub use room::{Room, RoomId, RoomRecord};
pub use scope::ScopeKey;
pub use student::{Student, StudentId, StudentRef};
pub use types::{Gender, Slot};
