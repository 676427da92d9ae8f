//! In-Memory File Registry Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::FileRegistryPort;
use crate::domain::download::{FileId, FileRecord};

/// 内存文件注册表
pub struct InMemoryFileRegistry {
    files: DashMap<FileId, FileRecord>,
}

impl InMemoryFileRegistry {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryFileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRegistryPort for InMemoryFileRegistry {
    fn insert(&self, record: FileRecord) -> Option<FileRecord> {
        let id = record.id.clone();
        let previous = self.files.insert(id.clone(), record);
        if let Some(old) = &previous {
            tracing::debug!(file_id = %id, old_path = %old.path.display(), "File record overwritten");
        }
        previous
    }

    fn resolve(&self, id: &FileId) -> Option<FileRecord> {
        self.files.get(id).map(|r| r.clone())
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}
