// ==========================================
// 考试排程系统 - 排程引擎错误类型
// ==========================================
// 致命错误才走 Err；兜底分配以 GenerationWarning 返回
// ==========================================

use thiserror::Error;

/// 排程运行的致命错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// 存储不可达 / 必需数据表缺失 / 无可用资源
    #[error("数据不可用: {0}")]
    DataUnavailable(String),

    #[error("排程策略无效: {0}")]
    InvalidPolicy(String),

    /// 快照内部不一致（例如着色结果引用了未知模块）
    #[error("数据不一致: {0}")]
    InconsistentData(String),

    /// 清空+写入事务失败，已整体回滚
    #[error("排程提交失败: {0}")]
    CommitFailure(String),
}

/// Result 类型别名
pub type GenerationResult<T> = Result<T, GenerationError>;
