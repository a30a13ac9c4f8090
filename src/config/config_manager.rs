// ==========================================
// 考试排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::policy_config_trait::PolicyConfigReader;
use crate::config::scheduling_policy::{
    default_afternoon_slot, default_morning_slot, DEFAULT_EXAM_DURATION_MINUTES,
    DEFAULT_LEAD_TIME_DAYS, DEFAULT_STAFF_DAILY_CAP,
};
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在（或 config_kv 表尚未创建）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !crate::db::table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 解析数值型配置；缺失或非法时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: std::str::FromStr,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, "配置值无法解析，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 解析时刻型配置（HH:MM 或 HH:MM:SS）
    fn get_time_or_default(&self, key: &str, default: NaiveTime) -> Result<NaiveTime, Box<dyn Error>> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        let trimmed = raw.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"));

        match parsed {
            Ok(t) => Ok(t),
            Err(_) => {
                warn!(key, value = %raw, "时刻配置无法解析，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// PolicyConfigReader Trait 实现
// ==========================================
impl PolicyConfigReader for ConfigManager {
    fn get_staff_daily_cap(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::STAFF_DAILY_CAP, DEFAULT_STAFF_DAILY_CAP)
    }

    fn get_morning_slot(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time_or_default(config_keys::MORNING_SLOT, default_morning_slot())
    }

    fn get_afternoon_slot(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time_or_default(config_keys::AFTERNOON_SLOT, default_afternoon_slot())
    }

    fn get_exam_duration_minutes(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::EXAM_DURATION_MINUTES, DEFAULT_EXAM_DURATION_MINUTES)
    }

    fn get_lead_time_days(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::LEAD_TIME_DAYS, DEFAULT_LEAD_TIME_DAYS)
    }

    fn get_shuffle_seed(&self) -> Result<Option<u64>, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::SHUFFLE_SEED)? {
            Some(v) => v,
            None => return Ok(None),
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => Ok(Some(seed)),
            Err(_) => {
                warn!(value = %raw, "随机种子无法解析，忽略");
                Ok(None)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 监考负荷
    pub const STAFF_DAILY_CAP: &str = "exam_staff_daily_cap";

    // 时段
    pub const MORNING_SLOT: &str = "exam_morning_slot";
    pub const AFTERNOON_SLOT: &str = "exam_afternoon_slot";
    pub const EXAM_DURATION_MINUTES: &str = "exam_duration_minutes";

    // 日历
    pub const LEAD_TIME_DAYS: &str = "exam_lead_time_days";

    // 随机源
    pub const SHUFFLE_SEED: &str = "exam_shuffle_seed";

    pub const ALL: &[&str] = &[
        STAFF_DAILY_CAP,
        MORNING_SLOT,
        AFTERNOON_SLOT,
        EXAM_DURATION_MINUTES,
        LEAD_TIME_DAYS,
        SHUFFLE_SEED,
    ];
}
