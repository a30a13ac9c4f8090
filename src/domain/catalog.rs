// ==========================================
// 考试排程系统 - 课程目录领域模型
// ==========================================
// 职责: 模块/选课/教室/监考人员的只读快照
// 红线: 排程核心不修改目录数据
// ==========================================

use crate::domain::types::{
    DepartmentId, ModuleId, ProgramId, RoomId, RoomKind, StaffId, StudentId,
};
use serde::{Deserialize, Serialize};

// ==========================================
// Module - 课程模块
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub credits: i32,                  // 学分
    pub program_id: ProgramId,         // 所属专业
    pub department_id: DepartmentId,   // 所属院系（经由专业）
    pub enrolled_count: u32,           // 选课人数（去重学生数）
}

// ==========================================
// Enrollment - 选课记录
// ==========================================
// (student_id, module_id) 唯一；冲突边的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub module_id: ModuleId,
}

// ==========================================
// Room - 教室
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32, // 座位数 (> 0)
    pub kind: RoomKind,
}

impl Room {
    /// 是否能容纳指定人数
    pub fn fits(&self, headcount: u32) -> bool {
        self.capacity >= headcount
    }
}

// ==========================================
// Staff - 监考人员
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub department_id: DepartmentId,
}

// ==========================================
// CatalogSnapshot - 一次排程运行的数据快照
// ==========================================
// 排序约定:
// - modules: enrolled_count 降序, id 升序
// - rooms: capacity 升序, id 升序（best-fit 查找依赖此顺序）
// - staff: id 升序（固定随机种子时可复现）
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub modules: Vec<Module>,
    pub enrollments: Vec<Enrollment>,
    pub rooms: Vec<Room>,
    pub staff: Vec<Staff>,
}

impl CatalogSnapshot {
    /// 按约定顺序重新排序（供内存构造的快照使用）
    pub fn normalize(&mut self) {
        self.modules
            .sort_by(|a, b| b.enrolled_count.cmp(&a.enrolled_count).then(a.id.cmp(&b.id)));
        self.enrollments
            .sort_by(|a, b| a.student_id.cmp(&b.student_id).then(a.module_id.cmp(&b.module_id)));
        self.enrollments.dedup();
        self.rooms
            .sort_by(|a, b| a.capacity.cmp(&b.capacity).then(a.id.cmp(&b.id)));
        self.staff.sort_by_key(|s| s.id);
    }
}
