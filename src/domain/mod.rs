//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Download Context: 可下载产物（文件注册表的记录）
//! - Speech Context: 语音合成请求与时间标记

pub mod download;
pub mod speech;
