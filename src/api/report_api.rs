// ==========================================
// 考试排程系统 - 排程查询与导出 API
// ==========================================
// 职责: 已落库排程的冲突审计、列表查询、CSV 导出
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::PolicyConfigReader;
use crate::domain::{ConflictSummary, ExamRow};
use crate::repository::TimetableRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct TimetableReportApi {
    timetable_repo: Arc<TimetableRepository>,
    config: Arc<dyn PolicyConfigReader>,
}

impl TimetableReportApi {
    pub fn new(timetable_repo: Arc<TimetableRepository>, config: Arc<dyn PolicyConfigReader>) -> Self {
        Self {
            timetable_repo,
            config,
        }
    }

    /// 冲突审计（监考上限取当前生效策略）
    pub fn audit(&self) -> ApiResult<ConflictSummary> {
        let policy = self
            .config
            .load_policy()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(self.timetable_repo.audit(policy.staff_daily_cap)?)
    }

    pub fn count_exams(&self) -> ApiResult<u64> {
        Ok(self.timetable_repo.count_exams()?)
    }

    /// 考试列表（按开考时间排序）
    pub fn list_exams(&self) -> ApiResult<Vec<ExamRow>> {
        Ok(self.timetable_repo.list_exam_rows()?)
    }

    /// 导出 CSV
    ///
    /// # 返回
    /// - Ok(usize): 导出的行数
    pub fn export_csv(&self, path: &Path) -> ApiResult<usize> {
        let rows = self.list_exams()?;

        let mut writer =
            csv::Writer::from_path(path).map_err(|e| ApiError::ExportError(e.to_string()))?;
        for row in &rows {
            writer
                .serialize(row)
                .map_err(|e| ApiError::ExportError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ApiError::ExportError(e.to_string()))?;

        info!(rows = rows.len(), path = %path.display(), "排程已导出");
        Ok(rows.len())
    }
}
