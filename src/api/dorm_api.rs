// ==========================================
// 宿舍分配系统 - 宿舍分配 API
// ==========================================
// 职责: 加载/保存生命周期 + 会话操作转发 + ActionLog 记录
// ==========================================
// 生命周期:
// - load: 房间与名册并发读取，两者都成功才初始化
// - 未初始化时所有会话操作返回 NotInitialized
// - save: 单次写入，失败不重试，内存状态不变
// ==========================================

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::DormConfig;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::scope::ScopeKey;
use crate::domain::student::StudentId;
use crate::engine::{AllocationReport, DormSession, DormView};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::dorm_source::{DormAssignmentSink, DormRoomSource, StudentRosterSource};

/// 默认操作人
pub const DEFAULT_ACTOR: &str = "operator";

// ==========================================
// DormApi - 宿舍分配 API
// ==========================================
pub struct DormApi {
    config: DormConfig,
    room_source: Arc<dyn DormRoomSource>,
    roster_source: Arc<dyn StudentRosterSource>,
    sink: Arc<dyn DormAssignmentSink>,
    action_log_repo: Option<Arc<ActionLogRepository>>,
    actor: String,
    session: Option<DormSession>,
}

impl DormApi {
    /// 创建新的 DormApi 实例（未初始化）
    pub fn new(
        config: DormConfig,
        room_source: Arc<dyn DormRoomSource>,
        roster_source: Arc<dyn StudentRosterSource>,
        sink: Arc<dyn DormAssignmentSink>,
    ) -> Self {
        Self {
            config,
            room_source,
            roster_source,
            sink,
            action_log_repo: None,
            actor: DEFAULT_ACTOR.to_string(),
            session: None,
        }
    }

    /// 保存成功后写入操作日志
    pub fn with_action_log(mut self, repo: Arc<ActionLogRepository>) -> Self {
        self.action_log_repo = Some(repo);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 并发加载房间与名册
    ///
    /// # 返回
    /// - Ok(()): 会话已（重新）初始化
    /// - Err(LoadFailure): 任一读取失败或快照无效；已有会话被丢弃，API 回到未初始化
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> ApiResult<()> {
        self.session = None;

        let (rooms, students) = tokio::try_join!(
            self.room_source.load_rooms(),
            self.roster_source.load_students()
        )
        .map_err(|e| {
            warn!(error = %e, "数据加载失败");
            ApiError::LoadFailure(e.to_string())
        })?;

        let session = DormSession::new(self.config.clone(), rooms, students).map_err(|e| {
            warn!(error = %e, "加载数据无效");
            ApiError::LoadFailure(e.to_string())
        })?;
        self.session = Some(session);

        info!("数据加载完成");
        Ok(())
    }

    /// 应用新配置（下次加载同样生效）；已加载时床位数变化会整形当前矩阵
    pub fn apply_config(&mut self, config: DormConfig) {
        if let Some(session) = self.session.as_mut() {
            session.apply_config(config.clone());
        }
        self.config = config;
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// 保存当前 (年度, 学期, 宿舍楼) 的分配
    ///
    /// # 返回
    /// - Ok(usize): 写入的房间数
    /// - Err(SaveFailure): 写入失败，内存状态不变
    #[instrument(skip(self))]
    pub async fn save(&self) -> ApiResult<usize> {
        let session = self.session()?;
        let payload = session.save_payload();

        let saved = self.sink.save_assignments(&payload).await.map_err(|e| {
            warn!(error = %e, "分配保存失败");
            ApiError::SaveFailure(e.to_string())
        })?;

        info!(rooms = saved, scope = %session.scope(), "分配已保存");

        if let Some(repo) = &self.action_log_repo {
            let log = ActionLog::new(ActionType::SaveAssignment, self.actor.clone())
                .with_payload(serde_json::json!({ "rooms": payload }))
                .with_detail(format!("保存分配: {} ({} 间)", session.scope(), saved));
            // 日志写入失败不影响保存结果
            if let Err(e) = repo.insert(&log) {
                warn!(error = %e, "操作日志写入失败");
            }
        }

        Ok(saved)
    }

    // ==========================================
    // 范围
    // ==========================================

    pub fn scope(&self) -> ApiResult<ScopeKey> {
        Ok(self.session()?.scope().clone())
    }

    pub fn set_scope(&mut self, scope: ScopeKey) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.set_scope(scope);
        Ok(session.view())
    }

    pub fn set_year(&mut self, year: i32) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.set_year(year);
        Ok(session.view())
    }

    pub fn set_semester(&mut self, semester: i32) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.set_semester(semester);
        Ok(session.view())
    }

    pub fn set_dorm(&mut self, dorm_name: &str) -> ApiResult<DormView> {
        if dorm_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("宿舍楼名称不能为空".to_string()));
        }
        let session = self.session_mut()?;
        session.set_dorm(dorm_name);
        Ok(session.view())
    }

    pub fn set_grade(&mut self, grade: i32) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.set_grade(grade);
        Ok(session.view())
    }

    // ==========================================
    // 编辑
    // ==========================================

    /// 选中床位（原内容清为 Empty）
    pub fn select_slot(&mut self, room_index: usize, slot_index: usize) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.select_slot(room_index, slot_index)?;
        Ok(session.view())
    }

    /// 为选中床位指定候选（-1 表示排除）
    pub fn assign_candidate(&mut self, candidate_id: StudentId) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.assign_candidate(candidate_id)?;
        Ok(session.view())
    }

    /// 随机分配当前范围
    ///
    /// # 参数
    /// - seed: 指定时结果可复现；None 使用系统熵
    pub fn allocate(&mut self, seed: Option<u64>) -> ApiResult<AllocationReport> {
        let session = self.session_mut()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(session.allocate(&mut rng)?)
    }

    /// 恢复最近一次加载的快照
    pub fn reset(&mut self) -> ApiResult<DormView> {
        let session = self.session_mut()?;
        session.reset();
        Ok(session.view())
    }

    pub fn view(&self) -> ApiResult<DormView> {
        Ok(self.session()?.view())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn session(&self) -> ApiResult<&DormSession> {
        self.session.as_ref().ok_or(ApiError::NotInitialized)
    }

    fn session_mut(&mut self) -> ApiResult<&mut DormSession> {
        self.session.as_mut().ok_or(ApiError::NotInitialized)
    }
}
