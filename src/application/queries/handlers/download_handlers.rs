//! Download Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::FileRegistryPort;
use crate::application::queries::ResolveDownload;
use crate::domain::download::FileRecord;

/// ResolveDownload Handler
///
/// 未知 ID 是正常结果（文件可能尚未生成或属于别的会话），只返回 NotFound
pub struct ResolveDownloadHandler {
    registry: Arc<dyn FileRegistryPort>,
}

impl ResolveDownloadHandler {
    pub fn new(registry: Arc<dyn FileRegistryPort>) -> Self {
        Self { registry }
    }

    pub fn handle(&self, query: ResolveDownload) -> Result<FileRecord, ApplicationError> {
        self.registry.resolve(&query.file_id).ok_or_else(|| {
            tracing::debug!(file_id = %query.file_id, "No such file id");
            ApplicationError::not_found("File", query.file_id.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::download::FileId;
    use crate::infrastructure::memory::InMemoryFileRegistry;

    #[test]
    fn test_resolve_hit_and_miss() {
        let registry = InMemoryFileRegistry::new().arc();
        registry.insert(FileRecord::from_path("/tmp/out/clip123.mp4").unwrap());
        let handler = ResolveDownloadHandler::new(registry);

        let hit = handler
            .handle(ResolveDownload { file_id: FileId::new("clip123.mp4") })
            .unwrap();
        assert_eq!(hit.path, std::path::PathBuf::from("/tmp/out/clip123.mp4"));

        let miss = handler
            .handle(ResolveDownload { file_id: FileId::new("missing.mp4") })
            .unwrap_err();
        assert!(miss.to_string().contains("missing.mp4"));
    }
}
