// ==========================================
// 考试排程系统 - 持久化端口
// ==========================================
// 职责: 定义排程核心与数据存储之间的窄接口（不包含实现）
// 实现者: CatalogRepository / TimetableRepository（SQLite）
// 红线: 引擎不拼 SQL，只通过端口读写
// ==========================================

use crate::domain::{Enrollment, ExamRecord, Module, Room, Staff};
use crate::repository::error::RepositoryResult;

// ==========================================
// CatalogReader - 只读目录接口
// ==========================================
pub trait CatalogReader {
    /// 检查所需数据表是否可用（连接可用 + 表存在）
    fn check_available(&self) -> RepositoryResult<()> {
        Ok(())
    }

    /// 模块列表（含选课人数，按人数降序、id 升序）
    fn list_modules(&self) -> RepositoryResult<Vec<Module>>;

    /// 选课记录
    fn list_enrollments(&self) -> RepositoryResult<Vec<Enrollment>>;

    /// 教室列表（按容量升序）
    fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;

    /// 监考人员列表
    fn list_staff(&self) -> RepositoryResult<Vec<Staff>>;
}

// ==========================================
// TimetableWriter - 排程写入接口
// ==========================================
pub trait TimetableWriter {
    /// 清空旧排程并批量写入新排程（单个事务，失败整体回滚）
    ///
    /// # 返回
    /// - Ok(usize): 写入的考试条数
    fn replace_timetable(&self, records: &[ExamRecord]) -> RepositoryResult<usize>;
}
