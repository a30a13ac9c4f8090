// ==========================================
// 考试排程系统 - 引擎层
// ==========================================
// 职责: 冲突图、分组着色、时段与资源分配、提交编排
// 红线: Engine 不拼 SQL, 只经由 ports 读写
// ==========================================

pub mod assigner;
pub mod calendar;
pub mod coloring;
pub mod committer;
pub mod conflict_graph;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod ports;

// 重导出核心引擎
pub use assigner::{AssignmentOutcome, DailyStaffLoad, SlotAssigner};
pub use coloring::{ColorAssignment, DayGroup, GroupPartitioner};
pub use committer::{CommitPipeline, CommitSummary};
pub use conflict_graph::ConflictGraph;
pub use error::{GenerationError, GenerationResult};
pub use loader::DataLoader;
pub use orchestrator::{GenerationReport, TimetableOrchestrator, TimetablePlan};
pub use ports::{CatalogReader, TimetableWriter};
