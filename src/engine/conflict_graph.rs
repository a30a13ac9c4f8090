// ==========================================
// 考试排程系统 - 学生冲突图
// ==========================================
// 节点: 模块；边: 至少一名学生同时选修两个模块
// 无权图，重复边自动合并；孤立模块保留为度 0 节点
// ==========================================

use crate::domain::{Enrollment, Module, ModuleId, StudentId};
use petgraph::graphmap::UnGraphMap;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

// ==========================================
// ConflictGraph - 冲突图
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    graph: UnGraphMap<ModuleId, ()>,
}

impl ConflictGraph {
    /// 由选课快照构建冲突图
    ///
    /// # 参数
    /// - `modules`: 模块列表（决定节点集合）
    /// - `enrollments`: 选课记录（决定边集合）
    ///
    /// 引用未知模块的选课记录被忽略。
    #[instrument(skip_all, fields(
        modules_count = modules.len(),
        enrollments_count = enrollments.len()
    ))]
    pub fn build(modules: &[Module], enrollments: &[Enrollment]) -> Self {
        let mut graph: UnGraphMap<ModuleId, ()> = UnGraphMap::new();
        for module in modules {
            graph.add_node(module.id);
        }

        // 按学生分组，保持选课顺序并去重
        let mut by_student: BTreeMap<StudentId, Vec<ModuleId>> = BTreeMap::new();
        let mut ignored = 0usize;
        for enrollment in enrollments {
            if !graph.contains_node(enrollment.module_id) {
                ignored += 1;
                continue;
            }
            let list = by_student.entry(enrollment.student_id).or_default();
            if !list.contains(&enrollment.module_id) {
                list.push(enrollment.module_id);
            }
        }

        for list in by_student.values() {
            for (i, &a) in list.iter().enumerate() {
                for &b in &list[i + 1..] {
                    graph.add_edge(a, b, ());
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            students = by_student.len(),
            ignored_enrollments = ignored,
            "冲突图构建完成"
        );

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, module_id: ModuleId) -> bool {
        self.graph.contains_node(module_id)
    }

    /// 节点（按加入顺序）
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.graph.nodes()
    }

    /// 冲突模块
    pub fn neighbors(&self, module_id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.graph.neighbors(module_id)
    }

    /// 度（冲突模块数）
    pub fn degree(&self, module_id: ModuleId) -> usize {
        if !self.graph.contains_node(module_id) {
            return 0;
        }
        self.graph.neighbors(module_id).count()
    }

    /// 两模块是否冲突
    pub fn has_conflict(&self, a: ModuleId, b: ModuleId) -> bool {
        a != b && self.graph.contains_edge(a, b)
    }

    /// 全部边（a < b）
    pub fn edges(&self) -> Vec<(ModuleId, ModuleId)> {
        let mut seen = HashSet::new();
        let mut edges: Vec<(ModuleId, ModuleId)> = self
            .graph
            .all_edges()
            .map(|(a, b, _)| if a < b { (a, b) } else { (b, a) })
            .filter(|e| seen.insert(*e))
            .collect();
        edges.sort_unstable();
        edges
    }
}
