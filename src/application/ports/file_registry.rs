//! File Registry Port - 可下载文件注册表
//!
//! 进程内的 basename -> 绝对路径映射，具体实现在 infrastructure/memory 层

use crate::domain::download::{FileId, FileRecord};

/// File Registry Port
///
/// 记录只增不删；同 ID 的后写覆盖先写
pub trait FileRegistryPort: Send + Sync {
    /// 写入记录，返回被覆盖的旧记录
    fn insert(&self, record: FileRecord) -> Option<FileRecord>;

    /// 纯查询，无副作用
    fn resolve(&self, id: &FileId) -> Option<FileRecord>;

    /// 当前记录数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
