// ==========================================
// 宿舍分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 分配建议 + 人工最终控制权（保存前可逐床位修改）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Gender, Slot};

// 领域实体
pub use domain::{
    ActionLog, ActionType, GenderPolicy, Room, RoomAssignmentPayload, RoomRecord, ScopeKey,
    Student, StudentRef,
};

// 引擎
pub use engine::{
    AllocationReport, AssignmentMatrix, DormSession, DormView, EngineError, RoomAllocator,
    RosterStore, SelectionState, EXCLUDE_SENTINEL,
};

// API
pub use api::{ApiError, DormApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "宿舍分配系统";
