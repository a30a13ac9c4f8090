// ==========================================
// 排程引擎场景测试
// ==========================================
// 测试目标: 真实 SQLite 上的完整生成流程与排程性质
// ==========================================


use chrono::{Datelike, Weekday};
use exam_timetable::config::SchedulingPolicy;
use exam_timetable::domain::GenerationWarning;
use exam_timetable::engine::{TimetableOrchestrator, TimetableWriter};
use exam_timetable::logging;
use exam_timetable::repository::{CatalogRepository, TimetableRepository};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use test_helpers::{create_test_db, exam_days, monday, open_shared, seed, seed_triangle};

fn repos(db_path: &str) -> (CatalogRepository, TimetableRepository) {
    let conn = open_shared(db_path);
    (
        CatalogRepository::new(conn.clone()),
        TimetableRepository::new(conn),
    )
}

fn orchestrator() -> TimetableOrchestrator {
    TimetableOrchestrator::new(Arc::new(SchedulingPolicy::default()))
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_triangle_conflict_uses_three_days() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let (reader, writer) = repos(&db_path);

    let report = orchestrator()
        .run(&reader, &writer, monday(), Some(7))
        .expect("generation should succeed");

    assert_eq!(report.exams_generated, 3);
    assert_eq!(report.days_used, 3);
    assert_eq!(report.conflict_edges, 3);

    let days = exam_days(&writer.list_exam_records().unwrap());
    let distinct: HashSet<_> = days.values().collect();
    assert_eq!(distinct.len(), 3, "三角冲突的三门考试必须在三个不同日期");
    assert_eq!(report.first_exam_day, Some(monday() + chrono::Duration::days(7)));
}

#[test]
fn test_best_fit_room_for_large_module() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed(&db_path, |c| {
        c.department(1)
            .program(1, 1)
            .module(1, 1)
            .module(2, 1)
            .enroll_many(1, 150, 1)
            .enroll_many(1000, 12, 2)
            .room(20, 20)
            .room(300, 300)
            .staff(1, 1);
    });
    let (reader, writer) = repos(&db_path);

    let report = orchestrator()
        .run(&reader, &writer, monday(), Some(1))
        .expect("generation should succeed");
    assert!(report.warnings.is_empty());

    let records = writer.list_exam_records().unwrap();
    let room_of: HashMap<_, _> = records.iter().map(|r| (r.module_id, r.room_id)).collect();
    assert_eq!(room_of[&1], 300, "150 人必须分到 300 座教室");
    assert_eq!(room_of[&2], 20, "12 人取最小够用教室");
}

#[test]
fn test_oversized_module_falls_back_to_largest_room() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed(&db_path, |c| {
        c.department(1)
            .program(1, 1)
            .module(1, 1)
            .enroll_many(1, 40, 1)
            .room(1, 10)
            .room(2, 25)
            .staff(1, 1);
    });
    let (reader, writer) = repos(&db_path);

    let report = orchestrator()
        .run(&reader, &writer, monday(), Some(1))
        .expect("fallback must not abort the run");

    assert_eq!(report.capacity_violations(), 1);
    assert_eq!(
        report.warnings[0],
        GenerationWarning::CapacityViolation {
            module_id: 1,
            enrolled_count: 40,
            room_id: 2,
            room_capacity: 25,
        }
    );
    assert_eq!(writer.audit(3).unwrap().room_capacity_overflows, 1);
}

#[test]
fn test_seventh_module_triggers_staff_overload() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed(&db_path, |c| {
        c.department(1).program(1, 1);
        // 7 门互不冲突的模块 -> 同一考试日
        for module_id in 1..=7 {
            c.module(module_id, 1).enroll(module_id * 10, module_id);
        }
        c.room(1, 50).staff(1, 1).staff(2, 1);
    });
    let (reader, writer) = repos(&db_path);

    let report = orchestrator()
        .run(&reader, &writer, monday(), Some(3))
        .expect("overload must not abort the run");

    assert_eq!(report.exams_generated, 7);
    assert_eq!(report.days_used, 1);
    assert_eq!(report.staff_overloads(), 1);
    assert_eq!(report.capacity_violations(), 0);

    // 前 6 场各 3 场，第 7 场超出上限
    let records = writer.list_exam_records().unwrap();
    let mut per_staff: HashMap<i64, usize> = HashMap::new();
    for r in &records {
        *per_staff.entry(r.staff_id).or_default() += 1;
    }
    let mut counts: Vec<usize> = per_staff.values().copied().collect();
    counts.sort();
    assert_eq!(counts, vec![3, 4]);
    assert_eq!(writer.audit(3).unwrap().staff_overloaded_days, 1);
}

#[test]
fn test_generated_timetable_properties() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    // 40 门模块、120 名学生、每人 4 门
    let mut data_rng = StdRng::seed_from_u64(2026);
    let module_ids: Vec<i64> = (1..=40).collect();
    seed(&db_path, |c| {
        for dept in 1..=4 {
            c.department(dept).program(dept, dept);
            for s in 0..4 {
                c.staff(dept * 100 + s, dept);
            }
        }
        for &module_id in &module_ids {
            c.module(module_id, (module_id - 1) % 4 + 1);
        }
        for student_id in 1..=120 {
            let picked: Vec<i64> = module_ids.choose_multiple(&mut data_rng, 4).copied().collect();
            for module_id in picked {
                c.enroll(student_id, module_id);
            }
        }
        c.room(1, 10).room(2, 20).room(3, 40).room(4, 200);
    });
    let (reader, writer) = repos(&db_path);

    let report = orchestrator()
        .run(&reader, &writer, monday(), Some(99))
        .expect("generation should succeed");
    let records = writer.list_exam_records().unwrap();
    assert_eq!(records.len(), module_ids.len());
    assert_eq!(report.capacity_violations(), 0);

    // 冲突自由: 同一学生的考试不在同一天
    let days = exam_days(&records);
    let mut by_student: HashMap<i64, Vec<i64>> = HashMap::new();
    for (student_id, module_id) in test_helpers::load_enrollments(&db_path) {
        by_student.entry(student_id).or_default().push(module_id);
    }
    for (student_id, modules) in &by_student {
        let distinct: HashSet<_> = modules.iter().map(|m| days[m]).collect();
        assert_eq!(distinct.len(), modules.len(), "学生 {} 同日多场", student_id);
    }

    // 避开周末
    assert!(records
        .iter()
        .all(|r| !matches!(r.date().weekday(), Weekday::Sat | Weekday::Sun)));

    // 监考上限: 扣除兜底指派后，每人每日不超过 3 场
    let mut fallback: HashMap<(i64, chrono::NaiveDate), u32> = HashMap::new();
    for warning in &report.warnings {
        if let GenerationWarning::StaffOverload { staff_id, date, .. } = warning {
            *fallback.entry((*staff_id, *date)).or_default() += 1;
        }
    }
    let mut load: HashMap<(i64, chrono::NaiveDate), u32> = HashMap::new();
    for record in &records {
        *load.entry((record.staff_id, record.date())).or_default() += 1;
    }
    for (key, count) in &load {
        let extra = fallback.get(key).copied().unwrap_or(0);
        assert!(count - extra <= 3, "监考 {} 在 {} 有 {} 场", key.0, key.1, count);
    }

    let summary = writer.audit(3).unwrap();
    assert_eq!(summary.student_day_conflicts, 0);
    assert_eq!(summary.room_capacity_overflows, 0);
}

#[test]
fn test_same_seed_reproduces_timetable() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed(&db_path, |c| {
        c.department(1).department(2).program(1, 1).program(2, 2);
        for module_id in 1..=8 {
            c.module(module_id, if module_id % 2 == 0 { 1 } else { 2 });
        }
        c.enroll(1, 1).enroll(1, 2).enroll(2, 3).enroll(2, 4).enroll(3, 5).enroll(3, 6);
        c.room(1, 30).staff(1, 1).staff(2, 1).staff(3, 2).staff(4, 2);
    });
    let (reader, writer) = repos(&db_path);

    orchestrator().run(&reader, &writer, monday(), Some(11)).unwrap();
    let first = writer.list_exam_records().unwrap();
    orchestrator().run(&reader, &writer, monday(), Some(11)).unwrap();
    let second = writer.list_exam_records().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_weekend_generation_day_rolls_to_monday() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let (reader, writer) = repos(&db_path);

    // 周二 + 7 = 周二; 三个考试日: 周二/周三/周四
    let tuesday = monday() + chrono::Duration::days(1);
    orchestrator().run(&reader, &writer, tuesday, Some(5)).unwrap();
    let mut days: Vec<_> = exam_days(&writer.list_exam_records().unwrap())
        .into_values()
        .collect();
    days.sort();
    assert_eq!(
        days.iter().map(|d| d.weekday()).collect::<Vec<_>>(),
        vec![Weekday::Tue, Weekday::Wed, Weekday::Thu]
    );

    // 周四 + 7 = 周四; 第三个考试日跨过周末到周一
    let thursday = monday() + chrono::Duration::days(3);
    orchestrator().run(&reader, &writer, thursday, Some(5)).unwrap();
    let mut days: Vec<_> = exam_days(&writer.list_exam_records().unwrap())
        .into_values()
        .collect();
    days.sort();
    assert_eq!(
        days.iter().map(|d| d.weekday()).collect::<Vec<_>>(),
        vec![Weekday::Thu, Weekday::Fri, Weekday::Mon]
    );

    assert_eq!(writer.replace_timetable(&[]).unwrap(), 0);
}
