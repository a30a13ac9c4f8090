// ==========================================
// 考试排程系统 - 考试排程数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: exams 表的整体替换、查询、冲突审计
// ==========================================

use crate::db::{missing_tables, table_exists, REQUIRED_TIMETABLE_TABLES};
use crate::domain::{ConflictSummary, ExamRecord, ExamRow, EXAM_DATETIME_FORMAT};
use crate::engine::ports::TimetableWriter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Transaction};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// TimetableRepository - 考试排程仓储
// ==========================================
pub struct TimetableRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimetableRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入（事务内）
    // ==========================================

    /// 清空排程（事务内）
    ///
    /// 删除全部考试并重置自增序列，等价于 TRUNCATE ... RESTART IDENTITY；
    /// 依赖 exams 的表通过外键 ON DELETE CASCADE 一并清理。
    ///
    /// # 返回
    /// - Ok(usize): 删除的考试条数
    pub fn clear_timetable(tx: &Transaction<'_>) -> RepositoryResult<usize> {
        let deleted = tx.execute("DELETE FROM exams", [])?;

        // sqlite_sequence 仅在首次使用 AUTOINCREMENT 后存在
        if table_exists(tx, "sqlite_sequence")? {
            tx.execute("DELETE FROM sqlite_sequence WHERE name = 'exams'", [])?;
        }

        debug!(deleted, "旧排程已清空");
        Ok(deleted)
    }

    /// 批量写入考试（事务内）
    pub fn insert_exams(tx: &Transaction<'_>, records: &[ExamRecord]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare_cached(
            r#"
            INSERT INTO exams (module_id, staff_id, room_id, starts_at, duration_minutes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;

        let mut inserted = 0;
        for record in records {
            inserted += stmt.execute(params![
                record.module_id,
                record.staff_id,
                record.room_id,
                record.starts_at.format(EXAM_DATETIME_FORMAT).to_string(),
                record.duration_minutes,
            ])?;
        }

        Ok(inserted)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 统计考试条数
    pub fn count_exams(&self) -> RepositoryResult<u64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM exams", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// 读取全部考试记录（按开始时间、模块 id 排序）
    pub fn list_exam_records(&self) -> RepositoryResult<Vec<ExamRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT module_id, staff_id, room_id, starts_at, duration_minutes
            FROM exams
            ORDER BY starts_at, module_id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(module_id, staff_id, room_id, starts_at, duration_minutes)| {
                let starts_at = NaiveDateTime::parse_from_str(&starts_at, EXAM_DATETIME_FORMAT)
                    .map_err(|e| RepositoryError::FieldValueError {
                        field: "exams.starts_at".to_string(),
                        message: format!("{} ({})", e, starts_at),
                    })?;
                Ok(ExamRecord {
                    module_id,
                    staff_id,
                    room_id,
                    starts_at,
                    duration_minutes,
                })
            })
            .collect()
    }

    /// 考试清单（关联模块/监考/教室名称，按时间排序）
    pub fn list_exam_rows(&self) -> RepositoryResult<Vec<ExamRow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                ex.id, m.name, s.name, r.name, ex.starts_at, ex.duration_minutes,
                (SELECT COUNT(DISTINCT en.student_id)
                   FROM enrollments en
                  WHERE en.module_id = ex.module_id) AS enrolled_count,
                r.capacity
            FROM exams ex
            JOIN modules m ON m.id = ex.module_id
            JOIN staff s ON s.id = ex.staff_id
            JOIN rooms r ON r.id = ex.room_id
            ORDER BY ex.starts_at, ex.id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ExamRow {
                    exam_id: row.get(0)?,
                    module_name: row.get(1)?,
                    staff_name: row.get(2)?,
                    room_name: row.get(3)?,
                    starts_at: row.get(4)?,
                    duration_minutes: row.get(5)?,
                    enrolled_count: row.get(6)?,
                    room_capacity: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<ExamRow>>>()?;

        Ok(rows)
    }

    /// 冲突审计（基于已落库排程）
    ///
    /// # 参数
    /// - staff_daily_cap: 监考每日上限
    pub fn audit(&self, staff_daily_cap: u32) -> RepositoryResult<ConflictSummary> {
        let conn = self.get_conn()?;

        // 学生: 同一天多于一场
        let student_day_conflicts: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT en.student_id, substr(ex.starts_at, 1, 10) AS exam_day
                FROM enrollments en
                JOIN exams ex ON ex.module_id = en.module_id
                GROUP BY en.student_id, exam_day
                HAVING COUNT(*) > 1
            )
            "#,
            [],
            |row| row.get(0),
        )?;

        // 监考: 同一天超过上限
        let staff_overloaded_days: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT staff_id, substr(starts_at, 1, 10) AS exam_day
                FROM exams
                GROUP BY staff_id, exam_day
                HAVING COUNT(*) > ?1
            )
            "#,
            [staff_daily_cap],
            |row| row.get(0),
        )?;

        // 教室: 选课人数超过容量
        let room_capacity_overflows: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT ex.id
                FROM exams ex
                JOIN rooms r ON r.id = ex.room_id
                JOIN enrollments en ON en.module_id = ex.module_id
                GROUP BY ex.id, r.capacity
                HAVING COUNT(DISTINCT en.student_id) > r.capacity
            )
            "#,
            [],
            |row| row.get(0),
        )?;

        Ok(ConflictSummary {
            student_day_conflicts: student_day_conflicts as u64,
            staff_overloaded_days: staff_overloaded_days as u64,
            room_capacity_overflows: room_capacity_overflows as u64,
        })
    }
}

impl TimetableWriter for TimetableRepository {
    fn replace_timetable(&self, records: &[ExamRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;

        let missing = missing_tables(&conn, REQUIRED_TIMETABLE_TABLES)?;
        if !missing.is_empty() {
            return Err(RepositoryError::TableMissing(missing.join(", ")));
        }

        // 任一步失败时 tx 被 drop，整体回滚
        let tx = conn.transaction()?;
        let cleared = Self::clear_timetable(&tx)?;
        let inserted = Self::insert_exams(&tx, records)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(cleared, inserted, "排程替换事务已提交");
        Ok(inserted)
    }
}
