// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: generate() 结果语义、单飞守卫、配置覆写、CSV 导出
// ==========================================


use exam_timetable::api::{ConfigApi, TimetableApi, TimetableReportApi};
use exam_timetable::app::AppState;
use exam_timetable::config::{config_keys, ConfigManager, PolicyConfigReader};
use exam_timetable::domain::{Enrollment, Module, Room, Staff};
use exam_timetable::engine::CatalogReader;
use exam_timetable::repository::{CatalogRepository, RepositoryResult, TimetableRepository};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use test_helpers::{create_test_db, monday, open_shared, seed, seed_triangle};

// ==========================================
// 阻塞读取器：进入加载阶段后等待放行
// ==========================================
struct BlockingReader {
    inner: CatalogRepository,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl CatalogReader for BlockingReader {
    fn check_available(&self) -> RepositoryResult<()> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        self.inner.check_available()
    }
    fn list_modules(&self) -> RepositoryResult<Vec<Module>> {
        self.inner.list_modules()
    }
    fn list_enrollments(&self) -> RepositoryResult<Vec<Enrollment>> {
        self.inner.list_enrollments()
    }
    fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.inner.list_rooms()
    }
    fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
        self.inner.list_staff()
    }
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_generate_reports_success_message() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let state = AppState::new(db_path).unwrap();

    let outcome = state.timetable_api.generate_for(monday(), Some(3));
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "已生成 3 场考试，共 3 个考试日");
    assert_eq!(outcome.report.unwrap().exams_generated, 3);
    assert!(state.report_api.audit().unwrap().is_clean());
}

#[test]
fn test_generate_failure_is_returned_not_raised() {
    let temp_file = tempfile::NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_string_lossy().to_string();
    let state = AppState::new(db_path).unwrap();

    // 未建表
    let outcome = state.timetable_api.generate_for(monday(), None);
    assert!(!outcome.success);
    assert!(outcome.message.contains("数据不可用"), "{}", outcome.message);
    assert!(outcome.report.is_none());

    state.init_database().unwrap();
    let outcome = state.timetable_api.generate_for(monday(), None);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.report.unwrap().exams_generated, 0);
}

#[test]
fn test_concurrent_generation_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let conn = open_shared(&db_path);

    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let reader = BlockingReader {
        inner: CatalogRepository::new(conn.clone()),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let config: Arc<dyn PolicyConfigReader> =
        Arc::new(ConfigManager::from_connection(conn.clone()));
    let api = Arc::new(TimetableApi::new(
        Arc::new(reader),
        Arc::new(TimetableRepository::new(conn)),
        config,
    ));

    let first = {
        let api = api.clone();
        thread::spawn(move || api.generate_for(monday(), Some(1)))
    };

    // 第一次生成已进入加载阶段
    entered_rx.recv().unwrap();
    let second = api.generate_for(monday(), Some(1));
    assert!(!second.success);
    assert!(second.message.contains("generation already in progress"));

    release_tx.send(()).unwrap();
    let first = first.join().unwrap();
    assert!(first.success, "{}", first.message);

    // 守卫释放后可再次生成（预先放行）
    release_tx.send(()).unwrap();
    let third = api.generate_for(monday(), Some(1));
    assert!(third.success, "{}", third.message);
}

#[test]
fn test_config_overrides_drive_generation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed(&db_path, |c| {
        c.department(1).program(1, 1);
        for module_id in 1..=3 {
            c.module(module_id, 1).enroll(module_id, module_id);
        }
        c.room(1, 10).staff(1, 1).staff(2, 1);
    });
    let state = AppState::new(db_path).unwrap();

    state.config_api.update_config(config_keys::STAFF_DAILY_CAP, "1").unwrap();
    state.config_api.update_config(config_keys::LEAD_TIME_DAYS, "14").unwrap();
    state.config_api.update_config(config_keys::MORNING_SLOT, "08:30").unwrap();
    state.config_api.update_config(config_keys::EXAM_DURATION_MINUTES, "120").unwrap();

    let outcome = state.timetable_api.generate_for(monday(), Some(8));
    assert!(outcome.success, "{}", outcome.message);
    let report = outcome.report.unwrap();

    // 3 门同日、2 名监考、每日上限 1 -> 1 次兜底
    assert_eq!(report.staff_overloads(), 1);
    assert_eq!(report.first_exam_day, Some(monday() + chrono::Duration::days(14)));
    assert!(outcome.message.contains("1 条告警"));

    let rows = state.report_api.list_exams().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.duration_minutes == 120));
    assert!(rows.iter().any(|r| r.starts_at.ends_with("08:30:00")));
    assert_eq!(state.report_api.audit().unwrap().staff_overloaded_days, 1);
}

#[test]
fn test_invalid_stored_policy_fails_generation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let conn = open_shared(&db_path);
    let manager = Arc::new(ConfigManager::from_connection(conn.clone()));
    // 绕过 ConfigApi 校验直接写库
    manager
        .set_global_config_value(config_keys::AFTERNOON_SLOT, "08:00")
        .unwrap();

    let api = TimetableApi::new(
        Arc::new(CatalogRepository::new(conn.clone())),
        Arc::new(TimetableRepository::new(conn)),
        manager.clone(),
    );
    let outcome = api.generate_for(monday(), Some(1));
    assert!(!outcome.success);
    assert!(outcome.message.contains("排程策略无效"), "{}", outcome.message);

    let config_api = ConfigApi::new(manager);
    assert!(config_api.effective_policy().is_err());
}

#[test]
fn test_out_of_range_dates_fail_without_panicking() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let state = AppState::new(db_path.clone()).unwrap();

    // 超上限的提前天数在写入时即被拒绝
    assert!(state
        .config_api
        .update_config(config_keys::LEAD_TIME_DAYS, "4000000000")
        .is_err());
    assert!(state.timetable_api.generate_for(monday(), Some(1)).success);

    // 生成日位于日历末端
    let outcome = state.timetable_api.generate_for(chrono::NaiveDate::MAX, Some(1));
    assert!(!outcome.success);
    assert!(outcome.message.contains("排程策略无效"), "{}", outcome.message);

    // 绕过 ConfigApi 直接写入的超大值
    let manager = ConfigManager::from_connection(open_shared(&db_path));
    manager
        .set_global_config_value(config_keys::LEAD_TIME_DAYS, "4000000000")
        .unwrap();
    let outcome = state.timetable_api.generate_for(monday(), Some(1));
    assert!(!outcome.success);
    assert!(outcome.message.contains("排程策略无效"), "{}", outcome.message);

    // 失败运行不触碰上一次的排程
    assert_eq!(state.report_api.count_exams().unwrap(), 3);
}

#[test]
fn test_export_csv_writes_all_exams() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_triangle(&db_path);
    let conn = open_shared(&db_path);
    let timetable_repo = Arc::new(TimetableRepository::new(conn.clone()));
    let config: Arc<dyn PolicyConfigReader> = Arc::new(ConfigManager::from_connection(conn.clone()));
    let api = TimetableApi::new(
        Arc::new(CatalogRepository::new(conn)),
        timetable_repo.clone(),
        config.clone(),
    );
    assert!(api.generate_for(monday(), Some(2)).success);

    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("timetable.csv");
    let report_api = TimetableReportApi::new(timetable_repo, config);
    assert_eq!(report_api.export_csv(&out_path).unwrap(), 3);

    let mut csv_reader = csv::Reader::from_path(&out_path).unwrap();
    let headers = csv_reader.headers().unwrap().clone();
    assert!(headers.iter().any(|h| h == "module_name"));
    assert!(headers.iter().any(|h| h == "room_capacity"));
    assert_eq!(csv_reader.records().count(), 3);

    // 目标目录不存在 -> 导出错误
    let bad_path = out_dir.path().join("missing").join("timetable.csv");
    assert!(report_api.export_csv(&bad_path).is_err());
}
