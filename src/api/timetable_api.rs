// ==========================================
// 考试排程系统 - 排程生成 API
// ==========================================
// 职责: 对外唯一的生成入口 generate() -> (success, message)
// 红线: 任何结果都转成 GenerateOutcome 返回，不向调用方抛错
// 红线: 同进程内单飞（single-flight），并发调用直接拒绝
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::PolicyConfigReader;
use crate::engine::{CatalogReader, GenerationReport, TimetableOrchestrator, TimetableWriter};
use crate::repository::{CatalogRepository, TimetableRepository};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::{Arc, Mutex, TryLockError};
use tracing::{error, info, warn};

// ==========================================
// GenerateOutcome - 生成结果（对外）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub success: bool,
    pub message: String,
    pub report: Option<GenerationReport>,
}

impl GenerateOutcome {
    fn succeeded(report: GenerationReport) -> Self {
        Self {
            success: true,
            message: report.summary_message(),
            report: Some(report),
        }
    }

    fn failed(err: &ApiError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            report: None,
        }
    }
}

// ==========================================
// TimetableApi - 排程生成 API
// ==========================================
pub struct TimetableApi<R = CatalogRepository, W = TimetableRepository> {
    reader: Arc<R>,
    writer: Arc<W>,
    orchestrator: TimetableOrchestrator,
    generation_guard: Mutex<()>,
}

impl<R, W> TimetableApi<R, W>
where
    R: CatalogReader,
    W: TimetableWriter,
{
    /// 创建新的 TimetableApi 实例
    ///
    /// # 参数
    /// - reader: 目录读取端口
    /// - writer: 排程写入端口
    /// - config: 排程策略读取器
    pub fn new(reader: Arc<R>, writer: Arc<W>, config: Arc<dyn PolicyConfigReader>) -> Self {
        Self {
            reader,
            writer,
            orchestrator: TimetableOrchestrator::new(config),
            generation_guard: Mutex::new(()),
        }
    }

    /// 以本地当天为生成日执行排程
    pub fn generate(&self) -> GenerateOutcome {
        self.generate_for(Local::now().date_naive(), None)
    }

    /// 以指定生成日执行排程
    ///
    /// # 参数
    /// - today: 生成日（首个考试日由此推算）
    /// - seed_override: 覆盖策略中的随机种子
    pub fn generate_for(&self, today: NaiveDate, seed_override: Option<u64>) -> GenerateOutcome {
        match self.try_generate_for(today, seed_override) {
            Ok(report) => GenerateOutcome::succeeded(report),
            Err(e) => {
                error!(error = %e, "排程生成失败");
                GenerateOutcome::failed(&e)
            }
        }
    }

    /// 执行排程并返回结构化结果
    ///
    /// # 返回
    /// - Err(GenerationInProgress): 已有生成在执行
    /// - Err(Generation): 数据不可用 / 策略无效 / 提交失败
    pub fn try_generate_for(
        &self,
        today: NaiveDate,
        seed_override: Option<u64>,
    ) -> ApiResult<GenerationReport> {
        let _guard = match self.generation_guard.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!("已有排程生成在执行，拒绝本次请求");
                return Err(ApiError::GenerationInProgress);
            }
            // 上一次生成 panic 不影响后续运行：守卫不保护任何数据
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        info!(today = %today, seed = ?seed_override, "收到排程生成请求");
        let report = self.orchestrator.run(
            self.reader.as_ref(),
            self.writer.as_ref(),
            today,
            seed_override,
        )?;
        Ok(report)
    }
}
