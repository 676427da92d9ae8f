//! File Command Handlers

use std::sync::Arc;

use crate::application::commands::{PublishFile, PublishFileResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::FileRegistryPort;
use crate::domain::download::FileRecord;
use crate::infrastructure::events::EventPublisher;

/// PublishFile Handler
///
/// 先 stat 再登记：文件不存在时不会留下无法下载的记录
pub struct PublishFileHandler {
    registry: Arc<dyn FileRegistryPort>,
    event_publisher: Arc<EventPublisher>,
    namespace: String,
}

impl PublishFileHandler {
    pub fn new(
        registry: Arc<dyn FileRegistryPort>,
        event_publisher: Arc<EventPublisher>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            event_publisher,
            namespace: namespace.into(),
        }
    }

    pub async fn handle(&self, command: PublishFile) -> Result<PublishFileResponse, ApplicationError> {
        if !command.path.is_absolute() {
            return Err(ApplicationError::validation(format!(
                "Path must be absolute: {}",
                command.path.display()
            )));
        }

        let record = FileRecord::from_path(command.path)?;
        let download_path = record.id.download_path(&self.namespace)?;

        let metadata = tokio::fs::metadata(&record.path).await.map_err(|e| {
            tracing::error!(
                path = %record.path.display(),
                error = %e,
                "Failed to stat published file"
            );
            ApplicationError::Stat {
                path: record.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let size_in_bytes = metadata.len();

        let file_id = record.id.clone();
        self.registry.insert(record);
        self.event_publisher
            .publish_file_added(file_id.as_str(), &download_path, size_in_bytes);

        tracing::info!(
            file_id = %file_id,
            download_path = %download_path,
            size = size_in_bytes,
            "File published"
        );

        Ok(PublishFileResponse {
            download_path,
            size_in_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::download::FileId;
    use crate::infrastructure::events::ServerEvent;
    use crate::infrastructure::memory::InMemoryFileRegistry;
    use tempfile::tempdir;

    fn handler() -> (PublishFileHandler, Arc<InMemoryFileRegistry>, Arc<EventPublisher>) {
        let registry = InMemoryFileRegistry::new().arc();
        let events = EventPublisher::new().arc();
        let handler = PublishFileHandler::new(registry.clone(), events.clone(), "frameencoder");
        (handler, registry, events)
    }

    #[tokio::test]
    async fn test_publish_returns_download_path_and_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip123.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let (handler, registry, events) = handler();
        let mut sub = events.subscribe();
        let result = handler.handle(PublishFile { path: path.clone() }).await.unwrap();

        assert_eq!(result.download_path, "/frameencoder/downloads/clip123.mp4");
        assert_eq!(result.size_in_bytes, 10);
        assert_eq!(registry.resolve(&FileId::new("clip123.mp4")).unwrap().path, path);
        assert!(matches!(
            sub.receiver.recv().await.unwrap(),
            ServerEvent::FileAdded { size: 10, .. }
        ));
    }

    #[tokio::test]
    async fn test_publish_missing_file_fails_without_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.mp4");

        let (handler, registry, _) = handler();
        let err = handler.handle(PublishFile { path }).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Stat { .. }));
        assert!(registry.resolve(&FileId::new("missing.mp4")).is_none());
    }

    #[tokio::test]
    async fn test_publish_same_basename_overwrites() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("out.webm");
        let second = dir.path().join("b").join("out.webm");
        std::fs::write(&first, b"1").unwrap();
        std::fs::write(&second, b"22").unwrap();

        let (handler, registry, _) = handler();
        handler.handle(PublishFile { path: first }).await.unwrap();
        let result = handler.handle(PublishFile { path: second.clone() }).await.unwrap();

        assert_eq!(result.size_in_bytes, 2);
        assert_eq!(registry.resolve(&FileId::new("out.webm")).unwrap().path, second);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_relative_path_rejected() {
        let (handler, _, _) = handler();
        let err = handler
            .handle(PublishFile { path: "out/clip.mp4".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
