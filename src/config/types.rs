//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 远程语音合成配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 媒体目录配置（供实时组件与语音临时文件使用）
    #[serde(default)]
    pub media: MediaConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口（端口冲突时逐个递增）
    #[serde(default = "default_port")]
    pub port: u16,

    /// 来自环境变量 PORT 的覆盖值，只在第一次尝试绑定时使用
    #[serde(default)]
    pub port_override: Option<u16>,

    /// 最大绑定尝试次数，None 表示不限制
    #[serde(default)]
    pub max_bind_attempts: Option<u32>,

    /// 下载路径命名空间: /<namespace>/downloads/<id>
    #[serde(default = "default_download_namespace")]
    pub download_namespace: String,

    /// 下载前的等待时间（毫秒）
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,

    /// 根路径托管的目录
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// 前端构建产物目录
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    /// 构建产物的 URL 前缀
    #[serde(default = "default_dist_path")]
    pub dist_path: String,
}

fn default_static_enabled() -> bool {
    true
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_dist_path() -> String {
    "/ffmpegserver".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            base_dir: default_base_dir(),
            dist_dir: default_dist_dir(),
            dist_path: default_dist_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_download_namespace() -> String {
    "frameencoder".to_string()
}

fn default_download_delay_ms() -> u64 {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            port_override: None,
            max_bind_attempts: None,
            download_namespace: default_download_namespace(),
            download_delay_ms: default_download_delay_ms(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 第一次绑定使用的端口
    pub fn initial_port(&self) -> u16 {
        self.port_override.unwrap_or(self.port)
    }
}

/// 远程语音合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 合成网关基础 URL
    #[serde(default = "default_speech_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,

    /// 使用内置的假合成器（本地调试）
    #[serde(default)]
    pub fake: bool,
}

fn default_speech_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_speech_timeout() -> u64 {
    60
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            url: default_speech_url(),
            timeout_secs: default_speech_timeout(),
            fake: false,
        }
    }
}

/// 媒体目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// 视频输出目录
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// 帧缓存目录
    #[serde(default = "default_frame_dir")]
    pub frame_dir: PathBuf,

    /// 编码完成后是否保留帧
    #[serde(default)]
    pub keep_frames: bool,

    /// 是否允许客户端传任意编码参数
    #[serde(default)]
    pub allow_arbitrary_arguments: bool,

    /// 语音临时文件目录，未设置时使用 video_dir
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_video_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_frame_dir() -> PathBuf {
    std::env::temp_dir().join("frameserver-frames")
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_dir: default_video_dir(),
            frame_dir: default_frame_dir(),
            keep_frames: false,
            allow_arbitrary_arguments: false,
            scratch_dir: None,
        }
    }
}

impl MediaConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| self.video_dir.clone())
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.download_namespace, "frameencoder");
        assert_eq!(config.server.download_delay_ms, 1);
        assert_eq!(config.speech.url, "http://localhost:8000");
    }

    #[test]
    fn test_port_override_wins_for_first_attempt() {
        let mut config = ServerConfig::default();
        assert_eq!(config.initial_port(), 8080);
        config.port_override = Some(9000);
        assert_eq!(config.initial_port(), 9000);
    }

    #[test]
    fn test_scratch_dir_falls_back_to_video_dir() {
        let mut media = MediaConfig::default();
        assert_eq!(media.scratch_dir(), PathBuf::from("output"));
        media.scratch_dir = Some(PathBuf::from("/tmp/speech"));
        assert_eq!(media.scratch_dir(), PathBuf::from("/tmp/speech"));
    }
}
