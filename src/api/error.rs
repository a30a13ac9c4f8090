// ==========================================
// 考试排程系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository/Engine 错误为用户可读的消息
// ==========================================

use crate::engine::GenerationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 排程运行错误
    // ==========================================
    /// 同进程内已有一次生成在执行
    #[error("排程正在生成中，请稍后重试 (generation already in progress)")]
    GenerationInProgress,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::InvalidInput(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::TableMissing(msg) => {
                ApiError::DatabaseError(format!("数据表缺失: {}", msg))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::CheckConstraintViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::TableMissing("exams".into()).into();
        assert!(matches!(err, ApiError::DatabaseError(ref m) if m.contains("exams")));

        let err: ApiError = RepositoryError::LockError("poisoned".into()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
    }

    #[test]
    fn test_generation_error_is_transparent() {
        let err: ApiError = GenerationError::CommitFailure("constraint".into()).into();
        assert_eq!(err.to_string(), "排程提交失败: constraint");
        assert!(ApiError::GenerationInProgress
            .to_string()
            .contains("generation already in progress"));
    }
}
