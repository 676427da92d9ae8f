//! Frameserver - 帧编码工具的 HTTP 服务
//!
//! - Domain: download/, speech/
//! - Application: commands, queries, ports
//! - Infrastructure: http, realtime, memory, adapters, events

use std::sync::Arc;
use std::time::Duration;

use frameserver::application::SpeechSynthesizerPort;
use frameserver::config::{load_config, print_config, AppConfig};
use frameserver::infrastructure::adapters::{
    FakeSpeechClient, HttpSpeechClient, HttpSpeechClientConfig,
};
use frameserver::infrastructure::events::EventPublisher;
use frameserver::infrastructure::http::{AppState, HttpServer, ServerConfig, StateSettings};
use frameserver::infrastructure::memory::InMemoryFileRegistry;
use frameserver::infrastructure::realtime::{EventSocketServer, RealtimeOptions};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},frameserver={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：PORT > 环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Frameserver starting");
    print_config(&config);

    // 确保媒体目录存在
    let scratch_dir = config.media.scratch_dir();
    tokio::fs::create_dir_all(&config.media.video_dir).await?;
    tokio::fs::create_dir_all(&config.media.frame_dir).await?;
    tokio::fs::create_dir_all(&scratch_dir).await?;

    // 创建语音合成客户端
    let synthesizer: Arc<dyn SpeechSynthesizerPort> = if config.speech.fake {
        Arc::new(FakeSpeechClient::with_defaults())
    } else {
        let speech_config =
            HttpSpeechClientConfig::new(&config.speech.url).with_timeout(config.speech.timeout_secs);
        Arc::new(HttpSpeechClient::new(speech_config)?)
    };

    if !synthesizer.health_check().await {
        tracing::warn!(url = %config.speech.url, "Speech gateway is not reachable yet");
    }

    // 创建应用状态
    let state = AppState::new(
        InMemoryFileRegistry::new().arc(),
        synthesizer.clone(),
        EventPublisher::new().arc(),
        StateSettings {
            download_namespace: config.server.download_namespace.clone(),
            download_delay: Duration::from_millis(config.server.download_delay_ms),
            scratch_dir,
        },
    );

    let realtime_options = RealtimeOptions {
        video_dir: config.media.video_dir.clone(),
        frame_dir: config.media.frame_dir.clone(),
        keep_frames: config.media.keep_frames,
        allow_arbitrary_arguments: config.media.allow_arbitrary_arguments,
        synthesizer,
    };

    let mut server = HttpServer::new(
        ServerConfig::from(&config.server),
        state,
        realtime_options,
        EventSocketServer::factory(),
    );

    server
        .start(|addr| tracing::info!("Ready: http://{}", addr))
        .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");

    server.close().await?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
