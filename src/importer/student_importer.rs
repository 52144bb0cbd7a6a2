// ==========================================
// 宿舍分配系统 - 名册导入器
// ==========================================
// 文件列: id, name, stuid, grade, class, gender
// 落库: student 表（按 id 更新或插入，单事务）
// ==========================================

use crate::domain::student::{Student, StudentId};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::importer::summary::ImportSummary;
use crate::repository::dorm_repo::SqliteDormRepository;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub struct StudentImporter {
    repo: Arc<SqliteDormRepository>,
}

impl StudentImporter {
    pub fn new(repo: Arc<SqliteDormRepository>) -> Self {
        Self { repo }
    }

    /// 从文件导入名册
    ///
    /// 任一行映射失败则整体不落库
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let start = Instant::now();
        let records = UniversalFileParser.parse(file_path.as_ref())?;
        let students = Self::map_records(&records)?;
        let imported = self.repo.upsert_students(&students)?;

        let summary = ImportSummary {
            file: file_path.as_ref().display().to_string(),
            total_rows: records.len(),
            imported,
            elapsed_ms: start.elapsed().as_millis(),
        };
        info!(imported = summary.imported, elapsed_ms = summary.elapsed_ms as u64, "名册导入完成");
        Ok(summary)
    }

    /// 原始记录 → 学生（文件内 id 不得重复）
    pub fn map_records(records: &[RawRecord]) -> ImportResult<Vec<Student>> {
        let mut seen: HashSet<StudentId> = HashSet::with_capacity(records.len());

        records
            .iter()
            .map(|record| {
                let student = Student {
                    id: FieldMapper::required_num(record, "id")?,
                    name: FieldMapper::required_str(record, "name")?.to_string(),
                    stuid: record.get("stuid").unwrap_or_default().to_string(),
                    grade: FieldMapper::required_num(record, "grade")?,
                    class: FieldMapper::required_num(record, "class")?,
                    gender: FieldMapper::required_gender(record, "gender")?,
                };
                if !seen.insert(student.id) {
                    return Err(ImportError::DuplicateKey {
                        row: record.row,
                        key: format!("id={}", student.id),
                    });
                }
                Ok(student)
            })
            .collect()
    }
}
