// ==========================================
// 考试排程系统 - 数据加载器
// ==========================================
// 职责: 通过 CatalogReader 读取四张只读快照
// 输出: CatalogSnapshot（已按约定排序）
// 红线: 任一读取失败即 DataUnavailable，后续阶段不得执行
// ==========================================

use crate::domain::CatalogSnapshot;
use crate::engine::error::{GenerationError, GenerationResult};
use crate::engine::ports::CatalogReader;
use crate::repository::error::RepositoryError;
use tracing::{info, instrument};

fn unavailable(what: &str, err: RepositoryError) -> GenerationError {
    GenerationError::DataUnavailable(format!("{}: {}", what, err))
}

pub struct DataLoader<'a, R: CatalogReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: CatalogReader + ?Sized> DataLoader<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// 加载目录快照
    ///
    /// # 返回
    /// - Ok(CatalogSnapshot): 模块按人数降序、教室按容量升序
    /// - Err(DataUnavailable): 存储不可达、表缺失，或存在模块但无教室/监考
    #[instrument(skip(self))]
    pub fn load(&self) -> GenerationResult<CatalogSnapshot> {
        self.reader
            .check_available()
            .map_err(|e| unavailable("数据源不可用", e))?;

        let mut snapshot = CatalogSnapshot {
            modules: self
                .reader
                .list_modules()
                .map_err(|e| unavailable("读取模块失败", e))?,
            enrollments: self
                .reader
                .list_enrollments()
                .map_err(|e| unavailable("读取选课失败", e))?,
            rooms: self
                .reader
                .list_rooms()
                .map_err(|e| unavailable("读取教室失败", e))?,
            staff: self
                .reader
                .list_staff()
                .map_err(|e| unavailable("读取监考人员失败", e))?,
        };
        snapshot.normalize();

        if !snapshot.modules.is_empty() {
            if snapshot.rooms.is_empty() {
                return Err(GenerationError::DataUnavailable(
                    "存在待排模块但没有任何教室".to_string(),
                ));
            }
            if snapshot.staff.is_empty() {
                return Err(GenerationError::DataUnavailable(
                    "存在待排模块但没有任何监考人员".to_string(),
                ));
            }
        }

        info!(
            modules = snapshot.modules.len(),
            enrollments = snapshot.enrollments.len(),
            rooms = snapshot.rooms.len(),
            staff = snapshot.staff.len(),
            "目录快照加载完成"
        );

        Ok(snapshot)
    }
}
