// ==========================================
// 宿舍分配系统 - 房间导入器
// ==========================================
// 文件列: room_id, room_name, grade, year, semester, dorm_name, slot1..slotN
// slotK 为空表示该床位空置，否则为学生 id（必须已在名册中）
// 落库: dorm_room + dorm_room_member（单事务）
// ==========================================

use crate::domain::room::{RoomId, RoomRecord};
use crate::domain::student::{StudentId, StudentRef};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::importer::summary::ImportSummary;
use crate::repository::dorm_repo::SqliteDormRepository;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// 床位列前缀
pub const SLOT_COLUMN_PREFIX: &str = "slot";

pub struct RoomImporter {
    repo: Arc<SqliteDormRepository>,
}

impl RoomImporter {
    pub fn new(repo: Arc<SqliteDormRepository>) -> Self {
        Self { repo }
    }

    /// 从文件导入房间（需先导入名册）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let start = Instant::now();
        let records = UniversalFileParser.parse(file_path.as_ref())?;

        let names: HashMap<StudentId, String> = self
            .repo
            .find_all_students()?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();
        let rooms = Self::map_records(&records, &names)?;
        let imported = self.repo.upsert_rooms(&rooms)?;

        let summary = ImportSummary {
            file: file_path.as_ref().display().to_string(),
            total_rows: records.len(),
            imported,
            elapsed_ms: start.elapsed().as_millis(),
        };
        info!(imported = summary.imported, elapsed_ms = summary.elapsed_ms as u64, "房间导入完成");
        Ok(summary)
    }

    /// 原始记录 → 房间快照
    ///
    /// # 参数
    /// - names: 名册中的学生 id → 姓名
    pub fn map_records(
        records: &[RawRecord],
        names: &HashMap<StudentId, String>,
    ) -> ImportResult<Vec<RoomRecord>> {
        let mut seen_rooms: HashSet<RoomId> = HashSet::new();
        let mut seen_students: HashSet<StudentId> = HashSet::new();
        let mut rooms = Vec::with_capacity(records.len());

        for record in records {
            let room_id: RoomId = FieldMapper::required_num(record, "room_id")?;
            if !seen_rooms.insert(room_id) {
                return Err(ImportError::DuplicateKey {
                    row: record.row,
                    key: format!("room_id={}", room_id),
                });
            }

            let columns = slot_columns(record);
            let mut occupants: Vec<Option<StudentRef>> = vec![None; columns.last().map_or(0, |(n, _)| *n)];
            for (slot_no, column) in columns {
                let Some(student_id) = FieldMapper::optional_num::<StudentId>(record, &column)? else {
                    continue;
                };
                let name = names.get(&student_id).ok_or_else(|| ImportError::ForeignKeyViolation {
                    row: record.row,
                    message: format!("{} 引用的学生 id={} 不在名册中", column, student_id),
                })?;
                if !seen_students.insert(student_id) {
                    return Err(ImportError::DuplicateKey {
                        row: record.row,
                        key: format!("student_id={}", student_id),
                    });
                }
                occupants[slot_no - 1] = Some(StudentRef::new(student_id, name.clone()));
            }

            rooms.push(RoomRecord {
                room_id,
                room_name: FieldMapper::required_str(record, "room_name")?.to_string(),
                grade: FieldMapper::required_num(record, "grade")?,
                year: FieldMapper::required_num(record, "year")?,
                semester: FieldMapper::required_num(record, "semester")?,
                dorm_name: FieldMapper::required_str(record, "dorm_name")?.to_string(),
                occupants,
            });
        }

        Ok(rooms)
    }
}

/// 记录中的床位列 (序号, 列名)，按序号升序；序号从 1 开始
fn slot_columns(record: &RawRecord) -> Vec<(usize, String)> {
    let mut columns: Vec<(usize, String)> = record
        .fields
        .keys()
        .filter_map(|key| {
            let n: usize = key.strip_prefix(SLOT_COLUMN_PREFIX)?.parse().ok()?;
            (n >= 1).then(|| (n, key.clone()))
        })
        .collect();
    columns.sort();
    columns
}
