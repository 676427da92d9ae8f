//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量（`PORT` 单独作为端口覆盖值）
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 端口覆盖环境变量
const PORT_ENV: &str = "PORT";

/// 加载应用配置
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.download_namespace", "frameencoder")?
        .set_default("server.download_delay_ms", 1)?
        .set_default("speech.url", "http://localhost:8000")?
        .set_default("speech.timeout_secs", 60)?
        .set_default("speech.fake", false)?
        .set_default("media.video_dir", "output")?
        .set_default("media.keep_frames", false)?
        .set_default("media.allow_arbitrary_arguments", false)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: FRAMESERVER_
    // 层级分隔符: __ (双下划线)
    // 例如: FRAMESERVER_SPEECH__URL=http://polly-gateway:8000
    builder = builder.add_source(
        Environment::with_prefix("FRAMESERVER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. PORT 覆盖
    let port_override = parse_port_override(std::env::var(PORT_ENV).ok())?;
    builder = builder.set_override_option("server.port_override", port_override.map(i64::from))?;

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 解析 PORT 环境变量；空值视为未设置
fn parse_port_override(raw: Option<String>) -> Result<Option<u16>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<u16>().map(Some).map_err(|_| {
            ConfigError::ValidationError(format!("{} is not a valid port: {}", PORT_ENV, value))
        }),
    }
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 || config.server.port_override == Some(0) {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.max_bind_attempts == Some(0) {
        return Err(ConfigError::ValidationError(
            "max_bind_attempts must be at least 1".to_string(),
        ));
    }

    let namespace = &config.server.download_namespace;
    if namespace.is_empty() || namespace.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "Invalid download namespace: {:?}",
            namespace
        )));
    }

    let dist_path = &config.server.static_files.dist_path;
    if !dist_path.starts_with('/') || dist_path == "/" {
        return Err(ConfigError::ValidationError(format!(
            "Invalid static dist path: {:?}",
            dist_path
        )));
    }

    if !config.speech.fake && config.speech.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech URL cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    if let Some(port) = config.server.port_override {
        tracing::info!("Port Override ({}): {}", PORT_ENV, port);
    }
    tracing::info!("Download Namespace: /{}/downloads", config.server.download_namespace);
    if config.speech.fake {
        tracing::info!("Speech: fake synthesizer");
    } else {
        tracing::info!("Speech URL: {}", config.speech.url);
        tracing::info!("Speech Timeout: {}s", config.speech.timeout_secs);
    }
    tracing::info!("Video Directory: {:?}", config.media.video_dir);
    tracing::info!("Frame Directory: {:?}", config.media.frame_dir);
    tracing::info!("Scratch Directory: {:?}", config.media.scratch_dir());
    if config.server.static_files.enabled {
        tracing::info!(
            "Static Files: / -> {:?}, {} -> {:?}",
            config.server.static_files.base_dir,
            config.server.static_files.dist_path,
            config.server.static_files.dist_dir
        );
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
