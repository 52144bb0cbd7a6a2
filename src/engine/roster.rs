// ==========================================
// 宿舍分配系统 - 名册存储 (Roster Store)
// ==========================================
// 职责: 持有全部学生，加载后只读
// 索引: id → 下标
// ==========================================

use crate::domain::student::{Student, StudentId};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    students: Vec<Student>,
    index: HashMap<StudentId, usize>,
}

impl RosterStore {
    /// 从学生列表构建名册
    ///
    /// # 返回
    /// - Err(InvalidRoster): 学生ID重复
    pub fn load(students: Vec<Student>) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(students.len());
        for (i, student) in students.iter().enumerate() {
            if index.insert(student.id, i).is_some() {
                return Err(EngineError::InvalidRoster(format!(
                    "学生ID重复: {}",
                    student.id
                )));
            }
        }

        Ok(Self { students, index })
    }

    pub fn find(&self, id: StudentId) -> Option<&Student> {
        self.index.get(&id).map(|&i| &self.students[i])
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Gender;

    fn student(id: StudentId) -> Student {
        Student {
            id,
            name: format!("학생{}", id),
            stuid: format!("3{:03}", id),
            grade: 3,
            class: 1,
            gender: Gender::M,
        }
    }

    #[test]
    fn test_find_by_id() {
        let roster = RosterStore::load(vec![student(10), student(20)]).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find(20).map(|s| s.id), Some(20));
        assert!(roster.find(30).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = RosterStore::load(vec![student(1), student(1)]);
        assert!(matches!(result, Err(EngineError::InvalidRoster(_))));
    }
}
