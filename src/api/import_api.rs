// ==========================================
// 宿舍分配系统 - 导入 API
// ==========================================
// 职责: 封装名册/房间导入，并记录 ActionLog
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::api::error::ApiResult;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::importer::{ImportSummary, RoomImporter, StudentImporter};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::dorm_repo::SqliteDormRepository;

/// 导入API
pub struct ImportApi {
    dorm_repo: Arc<SqliteDormRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    actor: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(
        dorm_repo: Arc<SqliteDormRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            dorm_repo,
            action_log_repo,
            actor: actor.into(),
        }
    }

    /// 导入名册
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入结果
    /// - Err(ApiError::ImportError): 文件或数据错误（不落库）
    pub fn import_students(&self, file_path: &Path) -> ApiResult<ImportSummary> {
        let summary = StudentImporter::new(self.dorm_repo.clone()).import_file(file_path)?;
        self.record(ActionType::ImportStudents, &summary);
        Ok(summary)
    }

    /// 导入房间（引用的学生必须已在名册中）
    pub fn import_rooms(&self, file_path: &Path) -> ApiResult<ImportSummary> {
        let summary = RoomImporter::new(self.dorm_repo.clone()).import_file(file_path)?;
        self.record(ActionType::ImportRooms, &summary);
        Ok(summary)
    }

    fn record(&self, action_type: ActionType, summary: &ImportSummary) {
        let log = ActionLog::new(action_type, self.actor.clone())
            .with_payload(json!({
                "file": summary.file,
                "total_rows": summary.total_rows,
                "imported": summary.imported,
            }))
            .with_detail(format!("导入 {} 条记录", summary.imported));

        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "操作日志写入失败");
        }
    }
}
