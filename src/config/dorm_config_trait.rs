// ==========================================
// 宿舍分配系统 - 分配配置读取 Trait
// ==========================================
// 职责: 定义分配引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::dorm_config::DormConfig;
use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// DormConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DormConfigReader: Send + Sync {
    /// 获取每间床位数
    ///
    /// # 默认值
    /// - 4
    async fn get_slots_per_room(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取宿舍楼性别政策
    ///
    /// # 默认值
    /// - {"송죽관": "M", "동백관": "W"}
    async fn get_gender_policy(&self) -> Result<GenderPolicy, Box<dyn Error>>;

    /// 获取排除标记
    ///
    /// # 默认值
    /// - "제외"
    async fn get_excluded_marker(&self) -> Result<String, Box<dyn Error>>;

    /// 获取默认范围（年度、学期、宿舍楼、年级）
    ///
    /// # 默认值
    /// - 2025 / 1 / 송죽관 / 3
    async fn get_default_scope(&self) -> Result<ScopeKey, Box<dyn Error>>;

    /// 一次性读取完整配置
    async fn load_dorm_config(&self) -> Result<DormConfig, Box<dyn Error>> {
        let slots_per_room = self.get_slots_per_room().await?;
        let gender_policy = self.get_gender_policy().await?;
        let excluded_marker = self.get_excluded_marker().await?;
        let default_scope = self.get_default_scope().await?;

        Ok(DormConfig {
            slots_per_room,
            gender_policy,
            excluded_marker,
            default_scope,
        })
    }
}
