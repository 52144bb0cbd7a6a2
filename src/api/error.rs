// ==========================================
// 宿舍分配系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换仓储/引擎错误为用户可读的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 生命周期错误
    // ==========================================
    /// 房间或名册任一读取失败；API 保持未初始化
    #[error("数据加载失败: {0}")]
    LoadFailure(String),

    /// 写入失败；内存中的分配矩阵保持不变
    #[error("分配保存失败: {0}")]
    SaveFailure(String),

    #[error("尚未加载数据")]
    NotInitialized,

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("不符合入住条件: {0}")]
    NotEligible(String),

    #[error("房间不在当前范围内: {0}")]
    OutOfScope(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    /// 不变量违反（调用方缺陷）
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_fatal() {
            tracing::error!(error = %err, "引擎不变量违反");
            return ApiError::InternalError(err.to_string());
        }

        match err {
            EngineError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            EngineError::StudentNotFound(id) => ApiError::NotFound(format!("学生(id={})不存在", id)),
            EngineError::NotEligible { .. } => ApiError::NotEligible(err.to_string()),
            EngineError::OutOfScope { .. } => ApiError::OutOfScope(err.to_string()),
            EngineError::InvalidRoster(msg) => ApiError::LoadFailure(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => e.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_engine_error_is_internal() {
        let err: ApiError = EngineError::DuplicatePlacement {
            student_id: 1,
            first_room: 0,
            second_room: 1,
        }
        .into();
        assert!(matches!(err, ApiError::InternalError(_)));

        let err: ApiError = EngineError::Precondition("越界".to_string()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_engine_error_mapping() {
        let err: ApiError = EngineError::StudentNotFound(9).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = EngineError::OutOfScope {
            room_index: 1,
            scope: "2025-1 송죽관 grade=3".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::OutOfScope(_)));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }
}
