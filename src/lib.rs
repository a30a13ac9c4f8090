// ==========================================
// 考试排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 流程: 加载 -> 冲突图 -> 贪心着色 -> 时段/资源分配 -> 原子提交
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程核心
pub mod engine;

// 配置层 - 排程策略
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能观测
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CatalogSnapshot, ConflictSummary, Enrollment, ExamRecord, GenerationWarning, Module, Room,
    RoomKind, Staff,
};

// 引擎
pub use engine::{
    ConflictGraph, GenerationError, GenerationReport, GroupPartitioner, SlotAssigner,
    TimetableOrchestrator,
};

// 配置
pub use config::SchedulingPolicy;

// API
pub use api::{GenerateOutcome, TimetableApi, TimetableReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考试排程系统";
