// ==========================================
// 宿舍分配系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod dorm_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use dorm_api::DormApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
