//! Frameserver - 帧编码工具的 HTTP 服务核心
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Download Context: 已发布文件与下载 ID
//! - Speech Context: 合成请求与时间标记
//!
//! 应用层 (application/):
//! - Ports: SpeechSynthesizer, FileRegistry
//! - Commands: 发布文件、两遍语音合成
//! - Queries: 下载解析
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 路由、启动控制器（端口冲突重试）
//! - Realtime: 与 HTTP 共用端口的实时组件
//! - Memory: 文件注册表内存实现
//! - Adapters: 远程语音合成客户端
//! - Events: 服务器事件订阅

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
