// ==========================================
// 考试排程系统 - 引擎编排器
// ==========================================
// 用途: 串联 加载 -> 冲突图 -> 着色 -> 分配 -> 提交
// 红线: 单线程顺序执行，前一阶段完成后才进入下一阶段
// 红线: 计算全部在事务外完成，事务只包住 清空+写入
// ==========================================

use crate::config::{PolicyConfigReader, SchedulingPolicy};
use crate::domain::{CatalogSnapshot, GenerationWarning};
use crate::engine::assigner::{AssignmentOutcome, SlotAssigner};
use crate::engine::calendar::first_exam_day;
use crate::engine::coloring::{ColorAssignment, GroupPartitioner};
use crate::engine::committer::{CommitPipeline, CommitSummary};
use crate::engine::conflict_graph::ConflictGraph;
use crate::engine::error::{GenerationError, GenerationResult};
use crate::engine::loader::DataLoader;
use crate::engine::ports::{CatalogReader, TimetableWriter};
use crate::perf::PerfGuard;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// TimetablePlan - 未提交的排程方案
// ==========================================
#[derive(Debug, Clone)]
pub struct TimetablePlan {
    pub graph: ConflictGraph,
    pub coloring: ColorAssignment,
    pub start_date: NaiveDate,
    pub outcome: AssignmentOutcome,
}

// ==========================================
// GenerationReport - 排程运行报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub exams_generated: usize,
    pub days_used: usize,
    pub first_exam_day: Option<NaiveDate>,
    pub last_exam_day: Option<NaiveDate>,
    pub conflict_edges: usize,
    pub warnings: Vec<GenerationWarning>,
    pub policy: SchedulingPolicy,
}

impl GenerationReport {
    pub fn summary_message(&self) -> String {
        let summary = CommitSummary {
            exams_written: self.exams_generated,
            days: self.days_used,
        };
        if self.warnings.is_empty() {
            summary.message()
        } else {
            format!("{}（{} 条告警）", summary.message(), self.warnings.len())
        }
    }

    pub fn capacity_violations(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, GenerationWarning::CapacityViolation { .. }))
            .count()
    }

    pub fn staff_overloads(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, GenerationWarning::StaffOverload { .. }))
            .count()
    }
}

// ==========================================
// TimetableOrchestrator - 引擎编排器
// ==========================================
pub struct TimetableOrchestrator {
    config: Arc<dyn PolicyConfigReader>,
    partitioner: GroupPartitioner,
}

impl TimetableOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 排程策略读取器
    pub fn new(config: Arc<dyn PolicyConfigReader>) -> Self {
        Self {
            config,
            partitioner: GroupPartitioner::new(),
        }
    }

    /// 读取并校验策略
    pub fn load_policy(&self) -> GenerationResult<SchedulingPolicy> {
        self.config
            .load_policy()
            .map_err(|e| GenerationError::InvalidPolicy(e.to_string()))
    }

    /// 纯计算：由快照得出排程方案（不触碰存储）
    ///
    /// # 参数
    /// - snapshot: 目录快照
    /// - policy: 排程策略
    /// - today: 生成日期
    /// - rng: 随机源
    pub fn plan<G: Rng + ?Sized>(
        &self,
        snapshot: &CatalogSnapshot,
        policy: &SchedulingPolicy,
        today: NaiveDate,
        rng: &mut G,
    ) -> GenerationResult<TimetablePlan> {
        // ==========================================
        // 步骤1: 冲突图
        // ==========================================
        let graph = ConflictGraph::build(&snapshot.modules, &snapshot.enrollments);

        // ==========================================
        // 步骤2: 贪心着色 -> 考试日分组
        // ==========================================
        let coloring = self.partitioner.partition(&graph);
        let groups = coloring.day_groups();
        debug!(groups = groups.len(), "考试日分组完成");

        // ==========================================
        // 步骤3: 时段与资源分配
        // ==========================================
        let start_date = first_exam_day(today, policy.lead_time_days).ok_or_else(|| {
            GenerationError::InvalidPolicy(format!(
                "生成日 {} 加提前 {} 天超出可表示日期范围",
                today, policy.lead_time_days
            ))
        })?;
        let outcome = SlotAssigner::new(policy).assign(&groups, snapshot, start_date, rng)?;

        Ok(TimetablePlan {
            graph,
            coloring,
            start_date,
            outcome,
        })
    }

    /// 执行完整排程流程（随机源由策略种子或系统熵构造）
    ///
    /// # 参数
    /// - seed_override: 优先于策略中的 shuffle_seed
    pub fn run<R, W>(
        &self,
        reader: &R,
        writer: &W,
        today: NaiveDate,
        seed_override: Option<u64>,
    ) -> GenerationResult<GenerationReport>
    where
        R: CatalogReader + ?Sized,
        W: TimetableWriter + ?Sized,
    {
        let policy = self.load_policy()?;
        let mut rng = match seed_override.or(policy.shuffle_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(reader, writer, &policy, today, &mut rng)
    }

    /// 执行完整排程流程（调用方注入随机源）
    pub fn run_with_rng<R, W, G>(
        &self,
        reader: &R,
        writer: &W,
        policy: &SchedulingPolicy,
        today: NaiveDate,
        rng: &mut G,
    ) -> GenerationResult<GenerationReport>
    where
        R: CatalogReader + ?Sized,
        W: TimetableWriter + ?Sized,
        G: Rng + ?Sized,
    {
        let _perf = PerfGuard::new("timetable.generate");
        info!(today = %today, cap = policy.staff_daily_cap, "开始生成考试排程");
        match serde_json::to_string(policy) {
            Ok(snapshot) => debug!(policy = %snapshot, "生效排程策略"),
            Err(e) => warn!(error = %e, "排程策略序列化失败"),
        }

        let snapshot = DataLoader::new(reader).load()?;
        let plan = self.plan(&snapshot, policy, today, rng)?;

        let TimetablePlan { graph, outcome, .. } = plan;
        let AssignmentOutcome {
            records,
            warnings,
            exam_days,
            ..
        } = outcome;

        let summary = CommitPipeline::new(writer).commit(records, exam_days.len())?;

        let report = GenerationReport {
            exams_generated: summary.exams_written,
            days_used: summary.days,
            first_exam_day: exam_days.first().copied(),
            last_exam_day: exam_days.last().copied(),
            conflict_edges: graph.edge_count(),
            warnings,
            policy: policy.clone(),
        };

        info!(
            exams = report.exams_generated,
            days = report.days_used,
            capacity_violations = report.capacity_violations(),
            staff_overloads = report.staff_overloads(),
            "考试排程生成完成"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Enrollment, ExamRecord, Module, Room, RoomKind, Staff};
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCatalog {
        modules: Vec<Module>,
        enrollments: Vec<Enrollment>,
        rooms: Vec<Room>,
        staff: Vec<Staff>,
    }

    impl CatalogReader for MemoryCatalog {
        fn list_modules(&self) -> RepositoryResult<Vec<Module>> {
            Ok(self.modules.clone())
        }
        fn list_enrollments(&self) -> RepositoryResult<Vec<Enrollment>> {
            Ok(self.enrollments.clone())
        }
        fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
            Ok(self.rooms.clone())
        }
        fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
            Ok(self.staff.clone())
        }
    }

    #[derive(Default)]
    struct MemoryTimetable {
        rows: Mutex<Vec<ExamRecord>>,
        fail: bool,
    }

    impl TimetableWriter for MemoryTimetable {
        fn replace_timetable(&self, records: &[ExamRecord]) -> RepositoryResult<usize> {
            if self.fail {
                return Err(RepositoryError::DatabaseTransactionError("disk full".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            *rows = records.to_vec();
            Ok(rows.len())
        }
    }

    fn catalog() -> MemoryCatalog {
        let module = |id: i64, enrolled: u32| Module {
            id,
            name: format!("M{}", id),
            credits: 3,
            program_id: 1,
            department_id: 1,
            enrolled_count: enrolled,
        };
        MemoryCatalog {
            modules: vec![module(1, 2), module(2, 2), module(3, 2)],
            enrollments: vec![
                Enrollment { student_id: 1, module_id: 1 },
                Enrollment { student_id: 1, module_id: 2 },
                Enrollment { student_id: 2, module_id: 2 },
                Enrollment { student_id: 2, module_id: 3 },
                Enrollment { student_id: 3, module_id: 1 },
                Enrollment { student_id: 3, module_id: 3 },
            ],
            rooms: vec![Room {
                id: 1,
                name: "A101".into(),
                capacity: 30,
                kind: RoomKind::Standard,
            }],
            staff: vec![Staff {
                id: 1,
                name: "Lee".into(),
                department_id: 1,
            }],
        }
    }

    fn orchestrator() -> TimetableOrchestrator {
        TimetableOrchestrator::new(Arc::new(SchedulingPolicy::default()))
    }

    // 2026-03-02 周一
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn test_run_commits_triangle_on_three_days() {
        let reader = catalog();
        let writer = MemoryTimetable::default();

        let report = orchestrator().run(&reader, &writer, monday(), Some(42)).unwrap();

        assert_eq!(report.exams_generated, 3);
        assert_eq!(report.days_used, 3);
        assert_eq!(report.conflict_edges, 3);
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary_message(), "已生成 3 场考试，共 3 个考试日");
        // 周一 + 7 天 = 周一
        assert_eq!(report.first_exam_day, NaiveDate::from_ymd_opt(2026, 3, 9));

        let rows = writer.rows.lock().unwrap();
        let mut days: Vec<_> = rows.iter().map(|r| r.date()).collect();
        days.dedup();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_run_with_empty_catalog_commits_nothing() {
        let reader = MemoryCatalog::default();
        let writer = MemoryTimetable::default();

        let report = orchestrator().run(&reader, &writer, monday(), Some(1)).unwrap();
        assert_eq!(report.exams_generated, 0);
        assert_eq!(report.days_used, 0);
        assert_eq!(report.first_exam_day, None);
    }

    #[test]
    fn test_commit_failure_is_reported() {
        let reader = catalog();
        let writer = MemoryTimetable {
            fail: true,
            ..Default::default()
        };

        let err = orchestrator().run(&reader, &writer, monday(), Some(1)).unwrap_err();
        assert!(matches!(err, GenerationError::CommitFailure(_)));
    }

    #[test]
    fn test_invalid_policy_stops_before_loading() {
        let policy = SchedulingPolicy {
            staff_daily_cap: 0,
            ..SchedulingPolicy::default()
        };
        let orchestrator = TimetableOrchestrator::new(Arc::new(policy));
        let err = orchestrator
            .run(&catalog(), &MemoryTimetable::default(), monday(), None)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPolicy(_)));
    }

    #[test]
    fn test_today_at_calendar_end_is_an_error() {
        let writer = MemoryTimetable::default();
        let err = orchestrator()
            .run(&catalog(), &writer, NaiveDate::MAX, Some(1))
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPolicy(_)), "{err:?}");
        assert!(writer.rows.lock().unwrap().is_empty());
    }

    #[test]
    fn test_same_seed_same_plan() {
        let reader = catalog();
        let policy = SchedulingPolicy::default();
        let snapshot = DataLoader::new(&reader).load().unwrap();

        let a = orchestrator()
            .plan(&snapshot, &policy, monday(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = orchestrator()
            .plan(&snapshot, &policy, monday(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a.outcome.records, b.outcome.records);
        assert!(a.coloring.is_proper(&a.graph));
    }
}
