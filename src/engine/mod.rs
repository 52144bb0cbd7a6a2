// ==========================================
// 宿舍分配系统 - 引擎层
// ==========================================
// 职责: 实现分配规则引擎，不拼 SQL
// 红线: Engine 不拼 SQL, 所有资格判定必须输出 reason
// ==========================================

pub mod allocator;
pub mod eligibility;
pub mod error;
pub mod matrix;
pub mod projection;
pub mod roster;
pub mod selection;
pub mod session;

// 重导出核心引擎
pub use allocator::{AllocationReport, RoomAllocator};
pub use eligibility::{EligibilityRule, IneligibleReason};
pub use error::{EngineError, EngineResult};
pub use matrix::AssignmentMatrix;
pub use projection::{CandidateEntry, ColumnCapacity, DormView, RoomRow, ViewProjection};
pub use roster::RosterStore;
pub use selection::{CandidateChoice, SelectionMachine, SelectionState, EXCLUDE_SENTINEL};
pub use session::DormSession;
