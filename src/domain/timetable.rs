// ==========================================
// 考试排程系统 - 考试安排领域模型
// ==========================================
// 职责: 排程输出（考试记录）与非致命告警
// ==========================================

use crate::domain::types::{ModuleId, RoomId, StaffId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据库中 starts_at 的存储格式
pub const EXAM_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ExamRecord - 考试记录
// ==========================================
// 每次运行每个模块恰好一条；整体替换旧排程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub module_id: ModuleId,
    pub staff_id: StaffId,
    pub room_id: RoomId,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: u32,
}

impl ExamRecord {
    /// 考试日期
    pub fn date(&self) -> NaiveDate {
        self.starts_at.date()
    }
}

// ==========================================
// GenerationWarning - 排程告警
// ==========================================
// 兜底分配不会中断运行，但必须显式返回给调用方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationWarning {
    /// 无足够大的教室，已回退到最大教室
    CapacityViolation {
        module_id: ModuleId,
        enrolled_count: u32,
        room_id: RoomId,
        room_capacity: u32,
    },
    /// 所有候选监考人员当日已满负荷，已随机指派
    StaffOverload {
        module_id: ModuleId,
        date: NaiveDate,
        staff_id: StaffId,
    },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::CapacityViolation {
                module_id,
                enrolled_count,
                room_id,
                room_capacity,
            } => write!(
                f,
                "CAPACITY_VIOLATION: module={}, enrolled={}, room={}, capacity={}",
                module_id, enrolled_count, room_id, room_capacity
            ),
            GenerationWarning::StaffOverload {
                module_id,
                date,
                staff_id,
            } => write!(
                f,
                "STAFF_OVERLOAD: module={}, date={}, staff={}",
                module_id, date, staff_id
            ),
        }
    }
}

// ==========================================
// ConflictSummary - 已落库排程的冲突审计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub student_day_conflicts: u64,   // 同一天有多场考试的 (学生, 日期) 数
    pub staff_overloaded_days: u64,   // 超出每日上限的 (监考, 日期) 数
    pub room_capacity_overflows: u64, // 选课人数超过教室容量的考试数
}

impl ConflictSummary {
    pub fn is_clean(&self) -> bool {
        self.student_day_conflicts == 0
            && self.staff_overloaded_days == 0
            && self.room_capacity_overflows == 0
    }
}

// ==========================================
// ExamRow - 考试清单行（导出用）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRow {
    pub exam_id: i64,
    pub module_name: String,
    pub staff_name: String,
    pub room_name: String,
    pub starts_at: String,
    pub duration_minutes: u32,
    pub enrolled_count: u32,
    pub room_capacity: u32,
}
