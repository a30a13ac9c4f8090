// ==========================================
// 考试排程系统 - 考试日历
// ==========================================
// 职责: 首个考试日计算、周末跳过
// 红线: 日期推进一律 checked，越过可表示范围返回 None
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 是否周末（周六/周日）
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 若落在周末则顺延到下周一，否则原样返回
pub fn roll_past_weekend(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_add_signed(Duration::days(2)),
        Weekday::Sun => date.checked_add_signed(Duration::days(1)),
        _ => Some(date),
    }
}

/// 次日
pub fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(1))
}

/// 首个考试日：today + lead_time_days 之后（含）的第一个工作日
///
/// # 返回
/// - None: 结果超出 NaiveDate 可表示范围
pub fn first_exam_day(today: NaiveDate, lead_time_days: u32) -> Option<NaiveDate> {
    today
        .checked_add_signed(Duration::days(i64::from(lead_time_days)))
        .and_then(roll_past_weekend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_roll_past_weekend() {
        // 2026-01-10 是周六
        assert_eq!(roll_past_weekend(d(2026, 1, 10)), Some(d(2026, 1, 12)));
        assert_eq!(roll_past_weekend(d(2026, 1, 11)), Some(d(2026, 1, 12)));
        assert_eq!(roll_past_weekend(d(2026, 1, 14)), Some(d(2026, 1, 14)));
    }

    #[test]
    fn test_first_exam_day_respects_lead_time() {
        // 周一 + 7 = 周一
        assert_eq!(first_exam_day(d(2026, 1, 5), 7), Some(d(2026, 1, 12)));
        // 周六 + 7 = 周六 -> 周一
        assert_eq!(first_exam_day(d(2026, 1, 3), 7), Some(d(2026, 1, 12)));
        assert!(!is_weekend(first_exam_day(d(2026, 1, 4), 7).unwrap()));
    }

    #[test]
    fn test_date_overflow_returns_none() {
        assert_eq!(first_exam_day(d(2026, 1, 5), u32::MAX), None);
        assert_eq!(first_exam_day(NaiveDate::MAX, 1), None);
        assert_eq!(next_day(NaiveDate::MAX), None);
    }
}
