// ==========================================
// 考试排程系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储与 API 实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ConfigApi, TimetableApi, TimetableReportApi};
use crate::config::{ConfigManager, PolicyConfigReader};
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::perf::install_sqlite_tracing;
use crate::repository::{CatalogRepository, TimetableRepository};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    conn: Arc<Mutex<Connection>>,

    /// 排程生成API
    pub timetable_api: Arc<TimetableApi>,

    /// 排程查询/导出API
    pub report_api: Arc<TimetableReportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Err(String): 数据库无法打开
    ///
    /// # 说明
    /// 不会自动建表；缺表时生成请求返回“数据不可用”
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));
        let timetable_repo = Arc::new(TimetableRepository::new(conn.clone()));

        // ==========================================
        // 初始化配置
        // ==========================================
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let policy_reader: Arc<dyn PolicyConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化API层
        // ==========================================
        let timetable_api = Arc::new(TimetableApi::new(
            catalog_repo,
            timetable_repo.clone(),
            policy_reader.clone(),
        ));
        let report_api = Arc::new(TimetableReportApi::new(timetable_repo, policy_reader));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            timetable_api,
            report_api,
            config_api,
        })
    }

    /// 建表（幂等）
    ///
    /// # 返回
    /// - Ok(i64): 当前 schema 版本
    pub fn init_database(&self) -> Result<i64, String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("数据库锁获取失败: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let version = read_schema_version(&conn)
            .map_err(|e| format!("读取 schema 版本失败: {}", e))?
            .unwrap_or(0);
        tracing::info!(version, "数据库结构已就绪");
        Ok(version)
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 EXAM_TIMETABLE_DB_PATH
/// 2. 用户数据目录/exam-timetable/exam_timetable.db
/// 3. ./exam_timetable.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("EXAM_TIMETABLE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./exam_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("exam-timetable");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("exam_timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}
