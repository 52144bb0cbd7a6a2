// ==========================================
// 分配引擎性质测试 (proptest)
// ==========================================
// 随机名册 + 随机房间 + 随机操作序列，验证:
// - 任一时刻同一学生至多占一个床位
// - 随机分配写入的学生均符合条件
// - 随机分配不改动已决定的床位，连续两次第二次不再填充
// - 重置后与初次加载一致
// - 操作不影响当前范围外的房间
// ==========================================

mod test_helpers;

use dorm_assign::config::DormConfig;
use dorm_assign::domain::{Gender, Room, RoomRecord, ScopeKey, Slot, Student, StudentRef};
use dorm_assign::engine::DormSession;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_helpers::student;

const DORMS: [&str; 3] = ["송죽관", "동백관", "별관"];

#[derive(Debug, Clone)]
enum Op {
    Allocate(u64),
    Edit { room: usize, slot: usize, pick: usize },
    Scope { dorm: usize, grade: i32, year: i32 },
    Reset,
}

// --- STRATEGIES ---

prop_compose! {
    fn arb_students()(
        specs in proptest::collection::vec((1..=3i32, 1..=5i32, any::<bool>()), 0..40)
    ) -> Vec<Student> {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (grade, class, male))| {
                let gender = if male { Gender::M } else { Gender::W };
                student(i as i64 + 1, grade, class, gender)
            })
            .collect()
    }
}

prop_compose! {
    fn arb_rooms()(
        specs in proptest::collection::vec((0..DORMS.len(), 1..=3i32, 2025..=2026i32, any::<bool>()), 1..8)
    ) -> Vec<RoomRecord> {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (dorm, grade, year, seeded))| {
                // 快照中的入住学生按房间下标各不相同
                let occupants = if seeded {
                    vec![None, Some(StudentRef::new(i as i64 + 1, format!("학생{}", i + 1)))]
                } else {
                    Vec::new()
                };
                RoomRecord {
                    room_id: 100 + i as i64,
                    room_name: format!("{}호", 100 + i),
                    grade,
                    year,
                    semester: 1,
                    dorm_name: DORMS[dorm].to_string(),
                    occupants,
                }
            })
            .collect()
    }
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u64>().prop_map(Op::Allocate),
        (0..8usize, 0..4usize, any::<usize>()).prop_map(|(room, slot, pick)| Op::Edit { room, slot, pick }),
        (0..DORMS.len(), 1..=3i32, 2025..=2026i32).prop_map(|(dorm, grade, year)| Op::Scope { dorm, grade, year }),
        Just(Op::Reset),
    ]
}

// --- HELPERS ---

fn rooms_outside(session: &DormSession) -> Vec<Room> {
    let scope = session.scope();
    session
        .matrix()
        .rooms()
        .iter()
        .filter(|room| !room.matches_scope(scope))
        .cloned()
        .collect()
}

fn apply(session: &mut DormSession, op: &Op) -> Result<(), TestCaseError> {
    match op {
        Op::Allocate(seed) => {
            let scope = session.scope().clone();
            let before: Vec<Room> = session.matrix().rooms().to_vec();
            let outside = rooms_outside(session);

            let mut rng = StdRng::seed_from_u64(*seed);
            session.allocate(&mut rng).map_err(|e| TestCaseError::fail(e.to_string()))?;

            for (room_index, room) in session.matrix().rooms().iter().enumerate() {
                for (slot_index, slot) in room.slots.iter().enumerate() {
                    let previous = &before[room_index].slots[slot_index];
                    if !previous.is_empty() {
                        prop_assert_eq!(slot, previous, "已决定的床位不应被改写");
                        continue;
                    }
                    if let Slot::Occupied(occupant) = slot {
                        let placed = session.roster().find(occupant.id).ok_or_else(|| {
                            TestCaseError::fail(format!("名册中不存在: {}", occupant.id))
                        })?;
                        prop_assert_eq!(placed.grade, scope.grade);
                        prop_assert_eq!(placed.class as usize, slot_index + 1);
                        prop_assert!(session.config().gender_policy.admits(&scope.dorm_name, placed.gender));
                    }
                }
            }
            prop_assert_eq!(rooms_outside(session), outside);

            let again = session
                .allocate(&mut StdRng::seed_from_u64(seed.wrapping_add(1)))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(again.filled, 0, "连续第二次分配不应再填充");
        }
        Op::Edit { room, slot, pick } => {
            let outside = rooms_outside(session);
            if session.select_slot(*room % session.matrix().len(), *slot).is_err() {
                return Ok(());
            }
            let candidates = session.view().candidates.unwrap_or_default();
            prop_assert!(!candidates.is_empty(), "排除选项必须存在");
            let chosen = &candidates[*pick % candidates.len()];
            session
                .assign_candidate(chosen.id)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(rooms_outside(session), outside);
        }
        Op::Scope { dorm, grade, year } => {
            session.set_scope(ScopeKey::new(*year, 1, DORMS[*dorm], *grade));
        }
        Op::Reset => session.reset(),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_engine_invariants_hold_for_any_operation_sequence(
        students in arb_students(),
        rooms in arb_rooms(),
        ops in proptest::collection::vec(arb_op(), 1..25)
    ) {
        let mut session = DormSession::new(DormConfig::default(), rooms.clone(), students.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let loaded = DormSession::new(DormConfig::default(), rooms, students)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for op in &ops {
            apply(&mut session, op)?;
            prop_assert!(session.matrix().verify_unique().is_ok(), "学生重复入住: {:?}", op);
        }

        session.reset();
        prop_assert_eq!(session.matrix().rooms(), loaded.matrix().rooms());
    }
}
