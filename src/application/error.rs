//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::SynthesisError;
use crate::domain::download::DownloadError;
use crate::domain::speech::SpeechError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 远程合成失败（携带远程错误码）
    #[error("Remote synthesis error {code}: {message}")]
    RemoteSynthesis { code: String, message: String },

    /// 远程调用成功但结果无法使用
    #[error("Malformed remote result: {0}")]
    MalformedRemoteResult(String),

    /// 本地文件读写错误
    #[error("Local IO error: {0}")]
    LocalIo(String),

    /// 发布文件时 stat 失败
    #[error("Cannot stat {path}: {reason}")]
    Stat { path: String, reason: String },

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建本地 IO 错误
    pub fn local_io(message: impl Into<String>) -> Self {
        Self::LocalIo(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::MalformedResult(msg) => Self::MalformedRemoteResult(msg),
            other => Self::RemoteSynthesis {
                code: other.code().to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<SpeechError> for ApplicationError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::EmptyText | SpeechError::EmptyVoice => Self::ValidationError(err.to_string()),
            SpeechError::NonUtf8Marks | SpeechError::InvalidMark { .. } => {
                Self::MalformedRemoteResult(err.to_string())
            }
        }
    }
}

impl From<DownloadError> for ApplicationError {
    fn from(err: DownloadError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
