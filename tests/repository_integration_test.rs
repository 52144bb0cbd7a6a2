// ==========================================
// 宿舍仓储集成测试
// ==========================================
// 测试目标: 通过协作方 Trait 验证加载/保存
// ==========================================

mod test_helpers;

use dorm_assign::logging;
use dorm_assign::domain::RoomAssignmentPayload;
use dorm_assign::repository::{
    DormAssignmentSink, DormRoomSource, RepositoryError, SqliteDormRepository, StudentRosterSource,
};
use test_helpers::{create_test_db, open_test_connection, seed_sample};

// ==========================================
// 测试用例 1: 加载名册与房间快照
// ==========================================
#[tokio::test]
async fn test_load_seeded_snapshot() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    let repo = seed_sample(conn).unwrap();

    let students = repo.load_students().await.unwrap();
    assert_eq!(students.len(), 13, "名册应包含 13 名学生");
    assert_eq!(students.first().map(|s| s.id), Some(1));

    let rooms = repo.load_rooms().await.unwrap();
    let ids: Vec<i64> = rooms.iter().map(|r| r.room_id).collect();
    assert_eq!(ids, vec![101, 102, 103, 201], "房间应按 room_id 排序");

    let room_101 = &rooms[0];
    assert_eq!(room_101.occupants.len(), 1);
    assert_eq!(room_101.occupants[0].as_ref().map(|s| s.id), Some(1));
    assert!(rooms[1].occupants.is_empty(), "空房间不应有入住记录");
}

// ==========================================
// 测试用例 2: 保存后重新加载保持床位位置
// ==========================================
#[tokio::test]
async fn test_save_then_reload_preserves_positions() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    let repo = seed_sample(conn).unwrap();

    let payload = vec![
        RoomAssignmentPayload {
            room_id: 101,
            year: 2025,
            semester: 1,
            users: vec![None, Some(2), None, Some(4)],
        },
        RoomAssignmentPayload {
            room_id: 102,
            year: 2025,
            semester: 1,
            users: vec![Some(5), None, None, None],
        },
    ];

    let saved = repo.save_assignments(&payload).await.unwrap();
    assert_eq!(saved, 2);

    let rooms = repo.load_rooms().await.unwrap();
    let room_101 = rooms.iter().find(|r| r.room_id == 101).unwrap();
    let ids: Vec<Option<i64>> = room_101
        .occupants
        .iter()
        .map(|o| o.as_ref().map(|s| s.id))
        .collect();
    assert_eq!(ids, vec![None, Some(2), None, Some(4)], "原入住学生 1 应被替换");

    let room_102 = rooms.iter().find(|r| r.room_id == 102).unwrap();
    assert_eq!(room_102.occupants.len(), 1);
    assert_eq!(room_102.occupants[0].as_ref().map(|s| s.id), Some(5));
}

// ==========================================
// 测试用例 3: 未知房间导致整体回滚
// ==========================================
#[tokio::test]
async fn test_save_unknown_room_rolls_back() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    let repo = seed_sample(conn).unwrap();

    let payload = vec![
        RoomAssignmentPayload {
            room_id: 102,
            year: 2025,
            semester: 1,
            users: vec![Some(6), None, None, None],
        },
        RoomAssignmentPayload {
            room_id: 999,
            year: 2025,
            semester: 1,
            users: vec![None, None, None, None],
        },
    ];

    let result = repo.save_assignments(&payload).await;
    assert!(
        matches!(result, Err(RepositoryError::NotFound { .. })),
        "未知房间应返回 NotFound"
    );

    let rooms = repo.load_rooms().await.unwrap();
    let room_102 = rooms.iter().find(|r| r.room_id == 102).unwrap();
    assert!(room_102.occupants.is_empty(), "失败的保存不应留下部分写入");
}

// ==========================================
// 测试用例 4: 引用不存在的学生被外键拒绝
// ==========================================
#[tokio::test]
async fn test_save_unknown_student_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    let repo = seed_sample(conn).unwrap();

    let payload = vec![RoomAssignmentPayload {
        room_id: 102,
        year: 2025,
        semester: 1,
        users: vec![Some(9999), None, None, None],
    }];

    assert!(repo.save_assignments(&payload).await.is_err());

    let rooms = repo.load_rooms().await.unwrap();
    let room_102 = rooms.iter().find(|r| r.room_id == 102).unwrap();
    assert!(room_102.occupants.is_empty());
}

// ==========================================
// 测试用例 5: 超出床位数的入住记录被忽略
// ==========================================
#[tokio::test]
async fn test_out_of_range_slot_no_is_ignored() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    seed_sample(conn.clone()).unwrap();

    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO dorm_room_member (room_id, slot_no, student_id) VALUES (102, 2000000000, 2)",
            [],
        )
        .unwrap();

    let repo = SqliteDormRepository::new(conn.clone());
    let rooms = repo.load_rooms().await.unwrap();
    let room_102 = rooms.iter().find(|r| r.room_id == 102).unwrap();
    assert!(room_102.occupants.is_empty(), "损坏的床位号不应导致超大分配");

    // 床位数放宽后，范围内的记录仍正常读取
    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO dorm_room_member (room_id, slot_no, student_id) VALUES (102, 5, 3)",
            [],
        )
        .unwrap();
    let rooms = SqliteDormRepository::new(conn)
        .with_slot_limit(6)
        .load_rooms()
        .await
        .unwrap();
    let room_102 = rooms.iter().find(|r| r.room_id == 102).unwrap();
    let ids: Vec<Option<i64>> = room_102.occupants.iter().map(|o| o.as_ref().map(|s| s.id)).collect();
    assert_eq!(ids, vec![None, None, None, None, None, Some(3)]);
}
