// ==========================================
// 考试排程系统 - 时段与资源分配引擎
// ==========================================
// 输入: 按颜色排序的考试日分组 + 目录快照 + 首个考试日
// 输出: ExamRecord 列表 + 兜底告警
// ==========================================
// 规则:
// 1) 分组逐日推进，落在周末则顺延到周一；处理完一组后 +1 天
// 2) 组内按“人数少的时段优先（平局给上午）”拆分上午/下午
// 3) 教室 best-fit：容量 >= 人数的最小教室；不存在则用最大教室并告警
// 4) 监考：本院系优先，其余次之，各自洗牌；当日负荷 < 上限者取第一个
//    全员满负荷时随机指派（不计负荷）并告警
// ==========================================

use crate::config::SchedulingPolicy;
use crate::domain::{
    CatalogSnapshot, DepartmentId, ExamRecord, ExamSlot, GenerationWarning, Module, ModuleId,
    Room, Staff, StaffId,
};
use crate::engine::calendar::{next_day, roll_past_weekend};
use crate::engine::coloring::DayGroup;
use crate::engine::error::{GenerationError, GenerationResult};
use chrono::{NaiveDate, NaiveTime};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// DailyStaffLoad - 监考每日负荷
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyStaffLoad {
    counts: HashMap<(StaffId, NaiveDate), u32>,
}

impl DailyStaffLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, staff_id: StaffId, date: NaiveDate) -> u32 {
        self.counts.get(&(staff_id, date)).copied().unwrap_or(0)
    }

    /// 负荷 +1，返回新值
    pub fn increment(&mut self, staff_id: StaffId, date: NaiveDate) -> u32 {
        let count = self.counts.entry((staff_id, date)).or_insert(0);
        *count += 1;
        *count
    }

    pub fn max_load(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }
}

// ==========================================
// 教室选择
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomChoice<'a> {
    /// 容量足够的最小教室
    Fit(&'a Room),
    /// 无足够大教室，回退到最大教室（可能超员）
    Fallback(&'a Room),
}

impl<'a> RoomChoice<'a> {
    pub fn room(&self) -> &'a Room {
        match self {
            RoomChoice::Fit(room) | RoomChoice::Fallback(room) => room,
        }
    }
}

/// best-fit 选教室
///
/// # 参数
/// - `rooms`: 按容量升序的教室列表
/// - `headcount`: 选课人数
///
/// # 返回
/// - None: 教室列表为空
pub fn select_room(rooms: &[Room], headcount: u32) -> Option<RoomChoice<'_>> {
    match rooms.iter().find(|room| room.fits(headcount)) {
        Some(room) => Some(RoomChoice::Fit(room)),
        None => rooms.last().map(RoomChoice::Fallback),
    }
}

// ==========================================
// 监考选择
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffChoice {
    /// 当日负荷未满，已计入负荷
    Assigned(StaffId),
    /// 全员满负荷，随机指派（未计入负荷）
    Overloaded(StaffId),
}

impl StaffChoice {
    pub fn staff_id(&self) -> StaffId {
        match self {
            StaffChoice::Assigned(id) | StaffChoice::Overloaded(id) => *id,
        }
    }
}

/// 选监考人员
///
/// # 返回
/// - None: 监考列表为空
pub fn select_staff<R: Rng + ?Sized>(
    staff: &[Staff],
    department_id: DepartmentId,
    date: NaiveDate,
    daily_cap: u32,
    load: &mut DailyStaffLoad,
    rng: &mut R,
) -> Option<StaffChoice> {
    let (mut preferred, mut others): (Vec<&Staff>, Vec<&Staff>) =
        staff.iter().partition(|s| s.department_id == department_id);
    preferred.shuffle(rng);
    others.shuffle(rng);

    for candidate in preferred.into_iter().chain(others) {
        if load.get(candidate.id, date) < daily_cap {
            load.increment(candidate.id, date);
            return Some(StaffChoice::Assigned(candidate.id));
        }
    }

    staff.choose(rng).map(|s| StaffChoice::Overloaded(s.id))
}

/// 上午/下午拆分：放入当前人数较少的时段，平局给上午
pub fn split_sessions(modules: &[ModuleId]) -> (Vec<ModuleId>, Vec<ModuleId>) {
    let mut morning = Vec::with_capacity(modules.len() / 2 + 1);
    let mut afternoon = Vec::with_capacity(modules.len() / 2);
    for &module_id in modules {
        if morning.len() <= afternoon.len() {
            morning.push(module_id);
        } else {
            afternoon.push(module_id);
        }
    }
    (morning, afternoon)
}

fn out_of_calendar(color: u32) -> GenerationError {
    GenerationError::InconsistentData(format!("第 {} 组考试日超出可表示日期范围", color))
}

// ==========================================
// AssignmentOutcome - 分配结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub records: Vec<ExamRecord>,
    pub warnings: Vec<GenerationWarning>,
    pub exam_days: Vec<NaiveDate>, // 每个分组实际使用的日期（按顺序）
    pub staff_load: DailyStaffLoad,
}

// ==========================================
// SlotAssigner - 时段与资源分配引擎
// ==========================================
pub struct SlotAssigner<'a> {
    policy: &'a SchedulingPolicy,
}

impl<'a> SlotAssigner<'a> {
    pub fn new(policy: &'a SchedulingPolicy) -> Self {
        Self { policy }
    }

    fn slot_time(&self, slot: ExamSlot) -> NaiveTime {
        match slot {
            ExamSlot::Morning => self.policy.morning_slot,
            ExamSlot::Afternoon => self.policy.afternoon_slot,
        }
    }

    /// 执行分配
    ///
    /// # 参数
    /// - `groups`: 颜色升序的考试日分组
    /// - `snapshot`: 目录快照（教室按容量升序）
    /// - `start_date`: 首个候选考试日
    /// - `rng`: 随机源（监考洗牌与兜底指派）
    #[instrument(skip(self, groups, snapshot, rng), fields(groups = groups.len()))]
    pub fn assign<R: Rng + ?Sized>(
        &self,
        groups: &[DayGroup],
        snapshot: &CatalogSnapshot,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> GenerationResult<AssignmentOutcome> {
        let modules_by_id: HashMap<ModuleId, &Module> =
            snapshot.modules.iter().map(|m| (m.id, m)).collect();

        let mut outcome = AssignmentOutcome::default();
        let mut current_date = Some(start_date);

        for group in groups {
            let day = current_date
                .and_then(roll_past_weekend)
                .ok_or_else(|| out_of_calendar(group.color))?;

            let (morning, afternoon) = split_sessions(&group.modules);
            debug!(
                color = group.color,
                date = %day,
                morning = morning.len(),
                afternoon = afternoon.len(),
                "处理考试日分组"
            );

            let sessions = [(ExamSlot::Morning, morning), (ExamSlot::Afternoon, afternoon)];
            for (slot, module_ids) in sessions.iter() {
                for module_id in module_ids {
                    let module = modules_by_id.get(module_id).ok_or_else(|| {
                        GenerationError::InconsistentData(format!(
                            "分组引用了未知模块: {}",
                            module_id
                        ))
                    })?;
                    let record =
                        self.assign_module(module, day, *slot, snapshot, &mut outcome, rng)?;
                    outcome.records.push(record);
                }
            }

            outcome.exam_days.push(day);
            current_date = next_day(day);
        }

        info!(
            exams = outcome.records.len(),
            days = outcome.exam_days.len(),
            warnings = outcome.warnings.len(),
            max_staff_load = outcome.staff_load.max_load(),
            "时段与资源分配完成"
        );

        Ok(outcome)
    }

    /// 单个模块的教室 + 监考分配
    fn assign_module<R: Rng + ?Sized>(
        &self,
        module: &Module,
        date: NaiveDate,
        slot: ExamSlot,
        snapshot: &CatalogSnapshot,
        outcome: &mut AssignmentOutcome,
        rng: &mut R,
    ) -> GenerationResult<ExamRecord> {
        let room = match select_room(&snapshot.rooms, module.enrolled_count) {
            Some(RoomChoice::Fit(room)) => room,
            Some(RoomChoice::Fallback(room)) => {
                warn!(
                    module_id = module.id,
                    enrolled = module.enrolled_count,
                    room_id = room.id,
                    capacity = room.capacity,
                    "无足够大的教室，回退到最大教室（可能超员）"
                );
                outcome.warnings.push(GenerationWarning::CapacityViolation {
                    module_id: module.id,
                    enrolled_count: module.enrolled_count,
                    room_id: room.id,
                    room_capacity: room.capacity,
                });
                room
            }
            None => {
                return Err(GenerationError::DataUnavailable(
                    "没有任何教室".to_string(),
                ))
            }
        };

        let staff_id = match select_staff(
            &snapshot.staff,
            module.department_id,
            date,
            self.policy.staff_daily_cap,
            &mut outcome.staff_load,
            rng,
        ) {
            Some(StaffChoice::Assigned(id)) => id,
            Some(StaffChoice::Overloaded(id)) => {
                warn!(
                    module_id = module.id,
                    date = %date,
                    staff_id = id,
                    cap = self.policy.staff_daily_cap,
                    "所有监考当日已满负荷，随机指派（可能超出上限）"
                );
                outcome.warnings.push(GenerationWarning::StaffOverload {
                    module_id: module.id,
                    date,
                    staff_id: id,
                });
                id
            }
            None => {
                return Err(GenerationError::DataUnavailable(
                    "没有任何监考人员".to_string(),
                ))
            }
        };

        Ok(ExamRecord {
            module_id: module.id,
            staff_id,
            room_id: room.id,
            starts_at: date.and_time(self.slot_time(slot)),
            duration_minutes: self.policy.exam_duration_minutes,
        })
    }
}
