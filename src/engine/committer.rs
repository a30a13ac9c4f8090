// ==========================================
// 考试排程系统 - 排程提交
// ==========================================
// 职责: 清空旧排程 + 批量写入新排程（单事务）
// 红线: 要么整体生效，要么旧排程原样保留
// ==========================================

use crate::domain::ExamRecord;
use crate::engine::error::{GenerationError, GenerationResult};
use crate::engine::ports::TimetableWriter;
use crate::perf::PerfGuard;
use tracing::{error, info, instrument};

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub exams_written: usize,
    pub days: usize,
}

impl CommitSummary {
    /// 面向用户的结果说明
    pub fn message(&self) -> String {
        format!(
            "已生成 {} 场考试，共 {} 个考试日",
            self.exams_written, self.days
        )
    }
}

pub struct CommitPipeline<'a, W: TimetableWriter + ?Sized> {
    writer: &'a W,
}

impl<'a, W: TimetableWriter + ?Sized> CommitPipeline<'a, W> {
    pub fn new(writer: &'a W) -> Self {
        Self { writer }
    }

    /// 提交排程（消费 records，提交后核心不再持有）
    #[instrument(skip(self, records), fields(records = records.len(), days))]
    pub fn commit(&self, records: Vec<ExamRecord>, days: usize) -> GenerationResult<CommitSummary> {
        let _perf = PerfGuard::new("timetable.commit");

        match self.writer.replace_timetable(&records) {
            Ok(exams_written) => {
                let summary = CommitSummary {
                    exams_written,
                    days,
                };
                info!(exams_written, days, "排程已提交");
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "排程提交失败，事务已回滚");
                Err(GenerationError::CommitFailure(e.to_string()))
            }
        }
    }
}
