// ==========================================
// 考试排程系统 - 排程策略读取 Trait
// ==========================================
// 职责: 定义排程引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::scheduling_policy::SchedulingPolicy;
use chrono::NaiveTime;
use std::error::Error;

// ==========================================
// PolicyConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）、SchedulingPolicy（固定值）
pub trait PolicyConfigReader: Send + Sync {
    /// 监考每日上限
    ///
    /// # 默认值
    /// - 3
    fn get_staff_daily_cap(&self) -> Result<u32, Box<dyn Error>>;

    /// 上午场开考时刻
    ///
    /// # 默认值
    /// - 09:00
    fn get_morning_slot(&self) -> Result<NaiveTime, Box<dyn Error>>;

    /// 下午场开考时刻
    ///
    /// # 默认值
    /// - 14:00
    fn get_afternoon_slot(&self) -> Result<NaiveTime, Box<dyn Error>>;

    /// 考试时长（分钟）
    ///
    /// # 默认值
    /// - 90
    fn get_exam_duration_minutes(&self) -> Result<u32, Box<dyn Error>>;

    /// 首个考试日距生成日的最短天数
    ///
    /// # 默认值
    /// - 7
    fn get_lead_time_days(&self) -> Result<u32, Box<dyn Error>>;

    /// 随机种子（None 表示使用系统熵）
    fn get_shuffle_seed(&self) -> Result<Option<u64>, Box<dyn Error>>;

    /// 组装并校验完整策略
    fn load_policy(&self) -> Result<SchedulingPolicy, Box<dyn Error>> {
        let policy = SchedulingPolicy {
            staff_daily_cap: self.get_staff_daily_cap()?,
            morning_slot: self.get_morning_slot()?,
            afternoon_slot: self.get_afternoon_slot()?,
            exam_duration_minutes: self.get_exam_duration_minutes()?,
            lead_time_days: self.get_lead_time_days()?,
            shuffle_seed: self.get_shuffle_seed()?,
        };
        policy.validate()?;
        Ok(policy)
    }
}

// 固定策略（测试/嵌入调用）
impl PolicyConfigReader for SchedulingPolicy {
    fn get_staff_daily_cap(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.staff_daily_cap)
    }

    fn get_morning_slot(&self) -> Result<NaiveTime, Box<dyn Error>> {
        Ok(self.morning_slot)
    }

    fn get_afternoon_slot(&self) -> Result<NaiveTime, Box<dyn Error>> {
        Ok(self.afternoon_slot)
    }

    fn get_exam_duration_minutes(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.exam_duration_minutes)
    }

    fn get_lead_time_days(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.lead_time_days)
    }

    fn get_shuffle_seed(&self) -> Result<Option<u64>, Box<dyn Error>> {
        Ok(self.shuffle_seed)
    }
}
