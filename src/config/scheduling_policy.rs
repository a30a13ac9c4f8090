// ==========================================
// 考试排程系统 - 排程策略参数
// ==========================================
// 职责: 排程常量的类型化载体（可由 config_kv 覆写）
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STAFF_DAILY_CAP: u32 = 3;
pub const DEFAULT_EXAM_DURATION_MINUTES: u32 = 90;
pub const DEFAULT_LEAD_TIME_DAYS: u32 = 7;
pub const MAX_LEAD_TIME_DAYS: u32 = 3650;

pub fn default_morning_slot() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub fn default_afternoon_slot() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN)
}

// ==========================================
// SchedulingPolicy - 排程策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    pub staff_daily_cap: u32,        // 监考每日上限
    pub morning_slot: NaiveTime,     // 上午场开考时刻
    pub afternoon_slot: NaiveTime,   // 下午场开考时刻
    pub exam_duration_minutes: u32,  // 考试时长
    pub lead_time_days: u32,         // 距生成日的最短提前天数
    pub shuffle_seed: Option<u64>,   // 监考洗牌随机种子（None = 系统熵）
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            staff_daily_cap: DEFAULT_STAFF_DAILY_CAP,
            morning_slot: default_morning_slot(),
            afternoon_slot: default_afternoon_slot(),
            exam_duration_minutes: DEFAULT_EXAM_DURATION_MINUTES,
            lead_time_days: DEFAULT_LEAD_TIME_DAYS,
            shuffle_seed: None,
        }
    }
}

impl SchedulingPolicy {
    /// 校验策略参数
    ///
    /// # 返回
    /// - Err(String): 违反项说明
    pub fn validate(&self) -> Result<(), String> {
        if self.staff_daily_cap == 0 {
            return Err("staff_daily_cap 必须 >= 1".to_string());
        }
        if self.exam_duration_minutes == 0 {
            return Err("exam_duration_minutes 必须 > 0".to_string());
        }
        if self.lead_time_days > MAX_LEAD_TIME_DAYS {
            return Err(format!(
                "lead_time_days 不得超过 {}: {}",
                MAX_LEAD_TIME_DAYS, self.lead_time_days
            ));
        }
        if self.morning_slot >= self.afternoon_slot {
            return Err(format!(
                "上午场 {} 必须早于下午场 {}",
                self.morning_slot, self.afternoon_slot
            ));
        }
        Ok(())
    }
}
