// ==========================================
// 考试排程系统 - 分组着色引擎
// ==========================================
// 算法: 贪心着色, largest-first 访问顺序
// 访问顺序: 度降序, 模块 id 升序（固定 tie-break, 结果可复现）
// 红线: 相邻节点颜色必不相同；颜色数不保证最少
// ==========================================

use crate::domain::ModuleId;
use crate::engine::conflict_graph::ConflictGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument};

// ==========================================
// DayGroup - 考试日分组
// ==========================================
// 同色模块互不冲突，可安排在同一天
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub color: u32,
    pub modules: Vec<ModuleId>, // 保持着色访问顺序
}

// ==========================================
// ColorAssignment - 着色结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorAssignment {
    colors: HashMap<ModuleId, u32>,
    visit_order: Vec<ModuleId>,
}

impl ColorAssignment {
    pub fn color_of(&self, module_id: ModuleId) -> Option<u32> {
        self.colors.get(&module_id).copied()
    }

    /// 使用的颜色数
    pub fn color_count(&self) -> usize {
        self.colors.values().collect::<BTreeSet<_>>().len()
    }

    pub fn visit_order(&self) -> &[ModuleId] {
        &self.visit_order
    }

    pub fn len(&self) -> usize {
        self.visit_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visit_order.is_empty()
    }

    /// 校验着色合法性：任一冲突边两端颜色不同
    pub fn is_proper(&self, graph: &ConflictGraph) -> bool {
        graph
            .edges()
            .into_iter()
            .all(|(a, b)| self.color_of(a) != self.color_of(b))
    }

    /// 按颜色升序分组（颜色 0 = 最早考试日）
    pub fn day_groups(&self) -> Vec<DayGroup> {
        let mut groups: BTreeMap<u32, Vec<ModuleId>> = BTreeMap::new();
        for module_id in &self.visit_order {
            if let Some(color) = self.color_of(*module_id) {
                groups.entry(color).or_default().push(*module_id);
            }
        }

        groups
            .into_iter()
            .map(|(color, modules)| DayGroup { color, modules })
            .collect()
    }
}

// ==========================================
// GroupPartitioner - 分组着色引擎
// ==========================================
pub struct GroupPartitioner {
    // 无状态引擎，不需要注入依赖
}

impl GroupPartitioner {
    pub fn new() -> Self {
        Self {}
    }

    /// largest-first 访问顺序
    pub fn visit_order(&self, graph: &ConflictGraph) -> Vec<ModuleId> {
        let mut order: Vec<(usize, ModuleId)> = graph
            .modules()
            .map(|id| (graph.degree(id), id))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        order.into_iter().map(|(_, id)| id).collect()
    }

    /// 贪心着色
    ///
    /// 每个节点取“已着色邻居未使用的最小颜色”。
    #[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn partition(&self, graph: &ConflictGraph) -> ColorAssignment {
        let visit_order = self.visit_order(graph);
        let mut colors: HashMap<ModuleId, u32> = HashMap::with_capacity(visit_order.len());

        for &module_id in &visit_order {
            let used: BTreeSet<u32> = graph
                .neighbors(module_id)
                .filter_map(|n| colors.get(&n).copied())
                .collect();

            let mut color = 0u32;
            while used.contains(&color) {
                color += 1;
            }
            colors.insert(module_id, color);
        }

        let assignment = ColorAssignment {
            colors,
            visit_order,
        };
        debug!(colors = assignment.color_count(), "贪心着色完成");
        assignment
    }
}

impl Default for GroupPartitioner {
    fn default() -> Self {
        Self::new()
    }
}
