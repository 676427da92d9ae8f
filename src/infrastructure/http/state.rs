//! Application State
//!
//! 各 Handler 共享的应用状态，由启动控制器持有并交给实时组件

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    PublishFileHandler, SynthesizeSpeechHandler,
    // Query handlers
    ResolveDownloadHandler,
    // Ports
    ApplicationError, FileRegistryPort, PublishFile, PublishFileResponse, SpeechSynthesizerPort,
};
use crate::infrastructure::events::EventPublisher;

/// 状态构造参数
#[derive(Debug, Clone)]
pub struct StateSettings {
    /// 下载路径命名空间
    pub download_namespace: String,
    /// 下载前等待时间
    pub download_delay: Duration,
    /// 语音临时文件目录
    pub scratch_dir: PathBuf,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            download_namespace: "frameencoder".to_string(),
            download_delay: Duration::from_millis(1),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub event_publisher: Arc<EventPublisher>,

    // ========== Settings ==========
    /// 下载路由与 `download_path` 共用的命名空间
    pub download_namespace: String,
    pub download_delay: Duration,

    // ========== Command Handlers ==========
    pub publish_file_handler: PublishFileHandler,
    pub synthesize_speech_handler: SynthesizeSpeechHandler,

    // ========== Query Handlers ==========
    pub resolve_download_handler: ResolveDownloadHandler,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn FileRegistryPort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        event_publisher: Arc<EventPublisher>,
        settings: StateSettings,
    ) -> Self {
        Self {
            event_publisher: event_publisher.clone(),

            download_namespace: settings.download_namespace.clone(),
            download_delay: settings.download_delay,

            publish_file_handler: PublishFileHandler::new(
                registry.clone(),
                event_publisher.clone(),
                settings.download_namespace,
            ),
            synthesize_speech_handler: SynthesizeSpeechHandler::new(synthesizer, settings.scratch_dir),

            resolve_download_handler: ResolveDownloadHandler::new(registry),
        }
    }

    /// 发布一个生成文件，供下载接口访问
    pub async fn add_file(
        &self,
        path: impl Into<PathBuf>,
    ) -> Result<PublishFileResponse, ApplicationError> {
        self.publish_file_handler
            .handle(PublishFile { path: path.into() })
            .await
    }
}
