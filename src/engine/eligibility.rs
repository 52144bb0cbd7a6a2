// ==========================================
// 宿舍分配系统 - 入住资格判定
// ==========================================
// 红线: 所有判定必须输出 reason
// ==========================================
// 资格条件:
// 1) 学生年级 == 范围年级
// 2) 学生班级 == 床位下标 + 1
// 3) 学生性别符合宿舍楼政策
// 4) 学生未在任何房间入住（由调用方提供已入住集合）
// ==========================================

use crate::domain::policy::GenderPolicy;
use crate::domain::scope::ScopeKey;
use crate::domain::student::{Student, StudentId};
use std::collections::HashSet;
use std::fmt;

/// 不符合资格的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    GradeMismatch,
    ClassMismatch,
    GenderNotAdmitted,
    AlreadyPlaced,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::GradeMismatch => write!(f, "GRADE_MISMATCH"),
            IneligibleReason::ClassMismatch => write!(f, "CLASS_MISMATCH"),
            IneligibleReason::GenderNotAdmitted => write!(f, "GENDER_NOT_ADMITTED"),
            IneligibleReason::AlreadyPlaced => write!(f, "ALREADY_PLACED"),
        }
    }
}

// ==========================================
// EligibilityRule - 资格判定器
// ==========================================
// 无状态，只借用政策
#[derive(Debug, Clone, Copy)]
pub struct EligibilityRule<'a> {
    policy: &'a GenderPolicy,
}

impl<'a> EligibilityRule<'a> {
    pub fn new(policy: &'a GenderPolicy) -> Self {
        Self { policy }
    }

    /// 年级 + 性别（不看班级与入住情况）
    ///
    /// 随机分配的候选池按此条件筛选
    pub fn admits(&self, student: &Student, scope: &ScopeKey) -> Result<(), IneligibleReason> {
        if student.grade != scope.grade {
            return Err(IneligibleReason::GradeMismatch);
        }
        if !self.policy.admits(&scope.dorm_name, student.gender) {
            return Err(IneligibleReason::GenderNotAdmitted);
        }
        Ok(())
    }

    /// 年级 + 班级 + 性别（不看入住情况）
    ///
    /// 剩余容量计数按此条件统计
    pub fn fits_column(
        &self,
        student: &Student,
        scope: &ScopeKey,
        slot_index: usize,
    ) -> Result<(), IneligibleReason> {
        self.admits(student, scope)?;
        if student.slot_index() != Some(slot_index) {
            return Err(IneligibleReason::ClassMismatch);
        }
        Ok(())
    }

    /// 完整资格判定（人工选择候选）
    pub fn check(
        &self,
        student: &Student,
        scope: &ScopeKey,
        slot_index: usize,
        placed: &HashSet<StudentId>,
    ) -> Result<(), IneligibleReason> {
        self.fits_column(student, scope, slot_index)?;
        if placed.contains(&student.id) {
            return Err(IneligibleReason::AlreadyPlaced);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Gender;

    fn policy() -> GenderPolicy {
        GenderPolicy::new()
            .with_dorm("송죽관", Gender::M)
            .with_dorm("동백관", Gender::W)
    }

    fn student(id: StudentId, grade: i32, class: i32, gender: Gender) -> Student {
        Student {
            id,
            name: format!("학생{}", id),
            stuid: String::new(),
            grade,
            class,
            gender,
        }
    }

    #[test]
    fn test_check_all_conditions() {
        let policy = policy();
        let rule = EligibilityRule::new(&policy);
        let scope = ScopeKey::new(2025, 1, "송죽관", 3);
        let placed: HashSet<StudentId> = [4].into_iter().collect();

        assert_eq!(rule.check(&student(1, 3, 2, Gender::M), &scope, 1, &placed), Ok(()));
        assert_eq!(
            rule.check(&student(2, 2, 2, Gender::M), &scope, 1, &placed),
            Err(IneligibleReason::GradeMismatch)
        );
        assert_eq!(
            rule.check(&student(3, 3, 2, Gender::W), &scope, 1, &placed),
            Err(IneligibleReason::GenderNotAdmitted)
        );
        assert_eq!(
            rule.check(&student(4, 3, 2, Gender::M), &scope, 1, &placed),
            Err(IneligibleReason::AlreadyPlaced)
        );
        assert_eq!(
            rule.check(&student(5, 3, 3, Gender::M), &scope, 1, &placed),
            Err(IneligibleReason::ClassMismatch)
        );
    }

    #[test]
    fn test_class_zero_never_fits() {
        let policy = policy();
        let rule = EligibilityRule::new(&policy);
        let scope = ScopeKey::new(2025, 1, "동백관", 1);
        assert_eq!(
            rule.fits_column(&student(1, 1, 0, Gender::W), &scope, 0),
            Err(IneligibleReason::ClassMismatch)
        );
    }
}
