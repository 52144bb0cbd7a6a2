// ==========================================
// 宿舍分配系统 - 宿舍楼性别政策
// ==========================================
// 宿舍楼名 → 允许入住的性别
// 未登记的宿舍楼不接收任何学生
// ==========================================

use crate::domain::types::Gender;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenderPolicy(BTreeMap<String, Gender>);

impl GenderPolicy {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_dorm(mut self, dorm_name: impl Into<String>, gender: Gender) -> Self {
        self.0.insert(dorm_name.into(), gender);
        self
    }

    pub fn allowed_gender(&self, dorm_name: &str) -> Option<Gender> {
        self.0.get(dorm_name).copied()
    }

    pub fn admits(&self, dorm_name: &str, gender: Gender) -> bool {
        self.allowed_gender(dorm_name) == Some(gender)
    }

    pub fn dorm_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dorm_admits_nobody() {
        let policy = GenderPolicy::new().with_dorm("송죽관", Gender::M);
        assert!(policy.admits("송죽관", Gender::M));
        assert!(!policy.admits("송죽관", Gender::W));
        assert!(!policy.admits("별관", Gender::M));
        assert!(!policy.admits("별관", Gender::W));
    }
}
