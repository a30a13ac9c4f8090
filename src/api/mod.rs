// ==========================================
// 考试排程系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod report_api;
pub mod timetable_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use report_api::TimetableReportApi;
pub use timetable_api::{GenerateOutcome, TimetableApi};
