// ==========================================
// 宿舍分配系统 - 宿舍数据仓储 (SQLite)
// ==========================================
// 对齐: student / dorm_room / dorm_room_member 表
// 红线: Repository 不含业务规则，只做数据映射
// ==========================================
// dorm_room_member.slot_no 从 0 开始，与床位下标一致
// ==========================================

use crate::config::dorm_config::DEFAULT_SLOTS_PER_ROOM;
use crate::domain::assignment::RoomAssignmentPayload;
use crate::domain::room::{RoomId, RoomRecord};
use crate::domain::student::{Student, StudentId, StudentRef};
use crate::domain::types::Gender;
use crate::repository::dorm_source::{DormAssignmentSink, DormRoomSource, StudentRosterSource};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, Result as SqliteResult, Row, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{instrument, warn};

// ==========================================
// SqliteDormRepository
// ==========================================
pub struct SqliteDormRepository {
    conn: Arc<Mutex<Connection>>,
    slot_limit: usize,
}

impl SqliteDormRepository {
    /// 创建新的宿舍仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            slot_limit: DEFAULT_SLOTS_PER_ROOM,
        }
    }

    /// 读取房间时忽略 slot_no >= slot_limit 的入住记录
    pub fn with_slot_limit(mut self, slot_limit: usize) -> Self {
        self.slot_limit = slot_limit;
        self
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作（导入使用）
    // ==========================================

    /// 批量写入学生（按 id 更新或插入）
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 数据库错误（整个事务回滚）
    pub fn upsert_students(&self, students: &[Student]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO student (id, name, stuid, grade, class, gender)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    stuid = excluded.stuid,
                    grade = excluded.grade,
                    class = excluded.class,
                    gender = excluded.gender
                "#,
            )?;
            for student in students {
                stmt.execute(params![
                    student.id,
                    student.name,
                    student.stuid,
                    student.grade,
                    student.class,
                    student.gender.to_db_str(),
                ])?;
                count += 1;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 批量写入房间及其当前入住学生
    ///
    /// 房间元数据按 room_id 更新或插入；入住记录整体替换
    pub fn upsert_rooms(&self, rooms: &[RoomRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for room in rooms {
            tx.execute(
                r#"
                INSERT INTO dorm_room (room_id, room_name, grade, year, semester, dorm_name)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(room_id) DO UPDATE SET
                    room_name = excluded.room_name,
                    grade = excluded.grade,
                    year = excluded.year,
                    semester = excluded.semester,
                    dorm_name = excluded.dorm_name
                "#,
                params![
                    room.room_id,
                    room.room_name,
                    room.grade,
                    room.year,
                    room.semester,
                    room.dorm_name,
                ],
            )?;

            let members: Vec<Option<StudentId>> = room
                .occupants
                .iter()
                .map(|o| o.as_ref().map(|s| s.id))
                .collect();
            Self::replace_members_tx(&tx, room.room_id, &members)?;
        }

        tx.commit()?;
        Ok(rooms.len())
    }

    /// 在事务中替换某房间的全部入住记录
    fn replace_members_tx(
        tx: &Transaction,
        room_id: RoomId,
        users: &[Option<StudentId>],
    ) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM dorm_room_member WHERE room_id = ?1",
            params![room_id],
        )?;

        let mut stmt = tx.prepare(
            "INSERT INTO dorm_room_member (room_id, slot_no, student_id) VALUES (?1, ?2, ?3)",
        )?;
        for (slot_no, student_id) in users.iter().enumerate() {
            if let Some(student_id) = student_id {
                stmt.execute(params![room_id, slot_no as i64, student_id])?;
            }
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询全部学生（按 id 排序）
    pub fn find_all_students(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, stuid, grade, class, gender FROM student ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], map_student_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(StudentRow::into_student).collect()
    }

    /// 查询全部房间（按 room_id 排序），含入住学生
    pub fn find_all_rooms(&self) -> RepositoryResult<Vec<RoomRecord>> {
        let conn = self.get_conn()?;

        let mut members: HashMap<RoomId, Vec<(usize, StudentRef)>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT m.room_id, m.slot_no, s.id, s.name
                FROM dorm_room_member m
                JOIN student s ON s.id = m.student_id
                ORDER BY m.room_id, m.slot_no
                "#,
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, RoomId>(0)?,
                        row.get::<_, i64>(1)?,
                        StudentRef::new(row.get(2)?, row.get::<_, String>(3)?),
                    ))
                })?
                .collect::<SqliteResult<Vec<_>>>()?;

            for (room_id, slot_no, student) in rows {
                let slot_no = usize::try_from(slot_no).map_err(|_| RepositoryError::FieldValueError {
                    field: "slot_no".to_string(),
                    message: format!("room_id={} 的床位号为负数: {}", room_id, slot_no),
                })?;
                if slot_no >= self.slot_limit {
                    warn!(room_id, slot_no, slot_limit = self.slot_limit, "床位号超出床位数，已忽略");
                    continue;
                }
                members.entry(room_id).or_default().push((slot_no, student));
            }
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT room_id, room_name, grade, year, semester, dorm_name
            FROM dorm_room
            ORDER BY room_id
            "#,
        )?;
        let rooms = stmt
            .query_map([], |row| {
                Ok(RoomRecord {
                    room_id: row.get(0)?,
                    room_name: row.get(1)?,
                    grade: row.get(2)?,
                    year: row.get(3)?,
                    semester: row.get(4)?,
                    dorm_name: row.get(5)?,
                    occupants: Vec::new(),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rooms
            .into_iter()
            .map(|mut room| {
                if let Some(list) = members.remove(&room.room_id) {
                    let len = list.iter().map(|(slot_no, _)| slot_no + 1).max().unwrap_or(0);
                    room.occupants = vec![None; len];
                    for (slot_no, student) in list {
                        room.occupants[slot_no] = Some(student);
                    }
                }
                room
            })
            .collect())
    }
}

// ==========================================
// 行映射
// ==========================================

struct StudentRow {
    id: StudentId,
    name: String,
    stuid: String,
    grade: i32,
    class: i32,
    gender: String,
}

impl StudentRow {
    fn into_student(self) -> RepositoryResult<Student> {
        let gender = Gender::parse(&self.gender).ok_or_else(|| RepositoryError::FieldValueError {
            field: "gender".to_string(),
            message: format!("学生 id={} 的性别无法识别: {}", self.id, self.gender),
        })?;

        Ok(Student {
            id: self.id,
            name: self.name,
            stuid: self.stuid,
            grade: self.grade,
            class: self.class,
            gender,
        })
    }
}

fn map_student_row(row: &Row) -> SqliteResult<StudentRow> {
    Ok(StudentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        stuid: row.get(2)?,
        grade: row.get(3)?,
        class: row.get(4)?,
        gender: row.get(5)?,
    })
}

// ==========================================
// 协作方 Trait 实现
// ==========================================

#[async_trait]
impl DormRoomSource for SqliteDormRepository {
    #[instrument(skip(self))]
    async fn load_rooms(&self) -> RepositoryResult<Vec<RoomRecord>> {
        let rooms = self.find_all_rooms()?;
        tracing::debug!(count = rooms.len(), "房间已加载");
        Ok(rooms)
    }
}

#[async_trait]
impl StudentRosterSource for SqliteDormRepository {
    #[instrument(skip(self))]
    async fn load_students(&self) -> RepositoryResult<Vec<Student>> {
        let students = self.find_all_students()?;
        tracing::debug!(count = students.len(), "名册已加载");
        Ok(students)
    }
}

#[async_trait]
impl DormAssignmentSink for SqliteDormRepository {
    /// 单事务写入：任一房间失败则整体回滚
    #[instrument(skip(self, payload), fields(rooms = payload.len()))]
    async fn save_assignments(&self, payload: &[RoomAssignmentPayload]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for room in payload {
            let updated = tx.execute(
                "UPDATE dorm_room SET year = ?1, semester = ?2 WHERE room_id = ?3",
                params![room.year, room.semester, room.room_id],
            )?;
            if updated == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "dorm_room".to_string(),
                    id: room.room_id.to_string(),
                });
            }
            Self::replace_members_tx(&tx, room.room_id, &room.users)?;
        }

        tx.commit()?;
        Ok(payload.len())
    }
}
