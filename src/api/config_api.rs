// ==========================================
// 考试排程系统 - 配置管理 API
// ==========================================
// 职责: 排程策略配置的查询与更新
// 红线: 只接受已知配置键；写入前校验取值，非法值不落库
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager, PolicyConfigReader, SchedulingPolicy};
use chrono::NaiveTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 配置项（未设置时 value 为 None，表示使用默认值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: Option<String>,
}

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 列出全部排程配置键及当前值
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        config_keys::ALL
            .iter()
            .map(|key| {
                let value = self
                    .config_manager
                    .get_global_config_value(key)
                    .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
                Ok(ConfigItem {
                    key: key.to_string(),
                    value,
                })
            })
            .collect()
    }

    /// 当前生效策略
    pub fn effective_policy(&self) -> ApiResult<SchedulingPolicy> {
        self.config_manager
            .load_policy()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 更新配置
    ///
    /// # 参数
    /// - key: 配置键（须为 config_keys::ALL 之一）
    /// - value: 配置值
    ///
    /// # 返回
    /// - Err(InvalidInput): 未知键或非法取值
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        validate_config_value(key, value)?;

        // 合入当前生效策略后整体校验（时段次序、提前天数上限）
        let mut candidate = self.effective_policy()?;
        let trimmed = value.trim();
        match key {
            config_keys::MORNING_SLOT => candidate.morning_slot = parse_slot(trimmed)?,
            config_keys::AFTERNOON_SLOT => candidate.afternoon_slot = parse_slot(trimmed)?,
            config_keys::LEAD_TIME_DAYS => candidate.lead_time_days = parse_u32(key, trimmed)?,
            _ => {}
        }
        candidate.validate().map_err(ApiError::InvalidInput)?;

        self.config_manager
            .set_global_config_value(key, trimmed)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        info!(key, value = trimmed, "排程配置已更新");
        Ok(())
    }
}

fn parse_slot(value: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ApiError::InvalidInput(format!("时刻格式应为 HH:MM: {}", value)))
}

fn parse_u32(key: &str, value: &str) -> ApiResult<u32> {
    value
        .parse::<u32>()
        .map_err(|_| ApiError::InvalidInput(format!("{} 须为非负整数: {}", key, value)))
}

/// 单值校验
fn validate_config_value(key: &str, value: &str) -> ApiResult<()> {
    let value = value.trim();
    match key {
        config_keys::STAFF_DAILY_CAP => {
            if parse_u32(key, value)? == 0 {
                return Err(ApiError::InvalidInput(format!("{} 必须 >= 1", key)));
            }
        }
        config_keys::EXAM_DURATION_MINUTES => {
            if parse_u32(key, value)? == 0 {
                return Err(ApiError::InvalidInput(format!("{} 必须 > 0", key)));
            }
        }
        config_keys::LEAD_TIME_DAYS => {
            parse_u32(key, value)?;
        }
        config_keys::MORNING_SLOT | config_keys::AFTERNOON_SLOT => {
            parse_slot(value)?;
        }
        config_keys::SHUFFLE_SEED => {
            value
                .parse::<u64>()
                .map_err(|_| ApiError::InvalidInput(format!("{} 须为 u64: {}", key, value)))?;
        }
        _ => return Err(ApiError::InvalidInput(format!("未知配置键: {}", key))),
    }
    Ok(())
}
