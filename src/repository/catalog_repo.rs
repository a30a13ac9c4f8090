// ==========================================
// 考试排程系统 - 课程目录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 模块/选课/教室/监考人员的只读查询
// ==========================================

use crate::db::{missing_tables, REQUIRED_CATALOG_TABLES};
use crate::domain::{Enrollment, Module, Room, RoomKind, Staff};
use crate::engine::ports::CatalogReader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository - 课程目录仓储
// ==========================================
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
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
}

impl CatalogReader for CatalogRepository {
    fn check_available(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let missing = missing_tables(&conn, REQUIRED_CATALOG_TABLES)?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::TableMissing(missing.join(", ")))
        }
    }

    fn list_modules(&self) -> RepositoryResult<Vec<Module>> {
        let conn = self.get_conn()?;

        // 院系经由专业获取；无选课的模块人数为 0
        let mut stmt = conn.prepare(
            r#"
            SELECT
                m.id, m.name, m.credits, m.program_id, p.department_id,
                COUNT(DISTINCT e.student_id) AS enrolled_count
            FROM modules m
            JOIN programs p ON p.id = m.program_id
            LEFT JOIN enrollments e ON e.module_id = m.id
            GROUP BY m.id, m.name, m.credits, m.program_id, p.department_id
            ORDER BY enrolled_count DESC, m.id ASC
            "#,
        )?;

        let modules = stmt
            .query_map([], |row| {
                Ok(Module {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    credits: row.get(2)?,
                    program_id: row.get(3)?,
                    department_id: row.get(4)?,
                    enrolled_count: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<Module>>>()?;

        Ok(modules)
    }

    fn list_enrollments(&self) -> RepositoryResult<Vec<Enrollment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT student_id, module_id FROM enrollments ORDER BY student_id, module_id",
        )?;

        let enrollments = stmt
            .query_map([], |row| {
                Ok(Enrollment {
                    student_id: row.get(0)?,
                    module_id: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<Enrollment>>>()?;

        Ok(enrollments)
    }

    fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, capacity, kind FROM rooms ORDER BY capacity ASC, id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, name, capacity, kind)| {
                let kind = kind
                    .parse::<RoomKind>()
                    .map_err(|message| RepositoryError::FieldValueError {
                        field: "rooms.kind".to_string(),
                        message,
                    })?;
                Ok(Room {
                    id,
                    name,
                    capacity,
                    kind,
                })
            })
            .collect()
    }

    fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare("SELECT id, name, department_id FROM staff ORDER BY id")?;

        let staff = stmt
            .query_map([], |row| {
                Ok(Staff {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    department_id: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<Staff>>>()?;

        Ok(staff)
    }
}
