// ==========================================
// 考试排程系统 - 领域类型定义
// ==========================================
// 职责: 标识符别名、教室类型、考试时段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== 标识符 =====
pub type ModuleId = i64;
pub type StudentId = i64;
pub type RoomId = i64;
pub type StaffId = i64;
pub type DepartmentId = i64;
pub type ProgramId = i64;

// ==========================================
// 教室类型 (Room Kind)
// ==========================================
// 序列化格式: lowercase (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Standard, // 普通教室
    Hall,     // 阶梯教室/大厅
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Standard => "standard",
            RoomKind::Hall => "hall",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(RoomKind::Standard),
            "hall" => Ok(RoomKind::Hall),
            other => Err(format!("未知教室类型: {}", other)),
        }
    }
}

// ==========================================
// 考试时段 (Exam Slot)
// ==========================================
// 每个考试日两个时段，具体时刻由 SchedulingPolicy 决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamSlot {
    Morning,   // 上午场
    Afternoon, // 下午场
}

impl fmt::Display for ExamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamSlot::Morning => write!(f, "MORNING"),
            ExamSlot::Afternoon => write!(f, "AFTERNOON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_kind_parse() {
        assert_eq!("hall".parse::<RoomKind>().unwrap(), RoomKind::Hall);
        assert_eq!(" Standard ".parse::<RoomKind>().unwrap(), RoomKind::Standard);
        assert!("amphi".parse::<RoomKind>().is_err());
        assert_eq!(RoomKind::Hall.to_string(), "hall");
    }
}
