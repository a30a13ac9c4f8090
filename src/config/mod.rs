// ==========================================
// 考试排程系统 - 配置层
// ==========================================
// 职责: 排程策略参数管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod policy_config_trait;
pub mod scheduling_policy;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use policy_config_trait::PolicyConfigReader;
pub use scheduling_policy::SchedulingPolicy;
