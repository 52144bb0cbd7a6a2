// ==========================================
// 宿舍分配系统 - 分配配置
// ==========================================
// 默认值与现行业务一致:
// - 每间 4 个床位（第 i 个床位对应 i+1 班）
// - 송죽관 → 男生, 동백관 → 女生
// ==========================================

use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use crate::domain::types::Gender;
use serde::{Deserialize, Serialize};

/// 默认每间床位数
pub const DEFAULT_SLOTS_PER_ROOM: usize = 4;

/// 默认排除标记
pub const DEFAULT_EXCLUDED_MARKER: &str = "제외";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormConfig {
    pub slots_per_room: usize,       // 每间床位数
    pub gender_policy: GenderPolicy, // 宿舍楼性别政策
    pub excluded_marker: String,     // 视图中 Excluded 床位的显示文字
    pub default_scope: ScopeKey,     // 启动时的默认范围
}

impl Default for DormConfig {
    fn default() -> Self {
        Self {
            slots_per_room: DEFAULT_SLOTS_PER_ROOM,
            gender_policy: default_gender_policy(),
            excluded_marker: DEFAULT_EXCLUDED_MARKER.to_string(),
            default_scope: ScopeKey::new(2025, 1, "송죽관", 3),
        }
    }
}

/// 默认宿舍楼性别政策
pub fn default_gender_policy() -> GenderPolicy {
    GenderPolicy::new()
        .with_dorm("송죽관", Gender::M)
        .with_dorm("동백관", Gender::W)
}
