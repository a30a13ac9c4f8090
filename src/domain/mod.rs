// ==========================================
// 考试排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use catalog::{CatalogSnapshot, Enrollment, Module, Room, Staff};
pub use timetable::{ConflictSummary, ExamRecord, ExamRow, GenerationWarning, EXAM_DATETIME_FORMAT};
pub use types::{
    DepartmentId, ExamSlot, ModuleId, ProgramId, RoomId, RoomKind, StaffId, StudentId,
};
