// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use dorm_assign::db::{init_schema, open_sqlite_connection};
use dorm_assign::domain::{Gender, RoomRecord, Student, StudentId, StudentRef};
use dorm_assign::repository::SqliteDormRepository;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（共享给多个仓储）
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

// ==========================================
// 测试数据构造
// ==========================================

pub fn student(id: StudentId, grade: i32, class: i32, gender: Gender) -> Student {
    Student {
        id,
        name: format!("학생{}", id),
        stuid: format!("{}{}{:02}", grade, class, id),
        grade,
        class,
        gender,
    }
}

pub fn room(
    room_id: i64,
    dorm_name: &str,
    grade: i32,
    occupants: Vec<Option<StudentRef>>,
) -> RoomRecord {
    RoomRecord {
        room_id,
        room_name: format!("{}호", room_id),
        grade,
        year: 2025,
        semester: 1,
        dorm_name: dorm_name.to_string(),
        occupants,
    }
}

pub fn occupant(id: StudentId) -> Option<StudentRef> {
    Some(StudentRef::new(id, format!("학생{}", id)))
}

/// 标准场景:
/// - 송죽관(男) 3 年级 2 间房 (101 中 1 号学生已入住第 1 床)
/// - 송죽관(男) 2 年级 1 间房
/// - 동백관(女) 3 年级 1 间房
/// - 名册: 3 年级男生 1..=8 (班级 1..4 各 2 人), 3 年级女生 21..=24, 2 年级男生 31
pub fn sample_students() -> Vec<Student> {
    let mut students: Vec<Student> = (1..=8)
        .map(|id| student(id, 3, ((id - 1) % 4 + 1) as i32, Gender::M))
        .collect();
    students.extend((21..=24).map(|id| student(id, 3, (id - 20) as i32, Gender::W)));
    students.push(student(31, 2, 1, Gender::M));
    students
}

pub fn sample_rooms() -> Vec<RoomRecord> {
    vec![
        room(101, "송죽관", 3, vec![occupant(1)]),
        room(102, "송죽관", 3, vec![]),
        room(103, "송죽관", 2, vec![]),
        room(201, "동백관", 3, vec![]),
    ]
}

/// 写入标准场景
pub fn seed_sample(conn: Arc<Mutex<Connection>>) -> Result<SqliteDormRepository, Box<dyn Error>> {
    let repo = SqliteDormRepository::new(conn);
    repo.upsert_students(&sample_students())?;
    repo.upsert_rooms(&sample_rooms())?;
    Ok(repo)
}
