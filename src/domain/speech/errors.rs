//! Speech Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("文本不能为空")]
    EmptyText,

    #[error("voiceId 不能为空")]
    EmptyVoice,

    #[error("标记流不是合法的 UTF-8")]
    NonUtf8Marks,

    #[error("第 {line} 行标记无法解析: {reason}")]
    InvalidMark { line: usize, reason: String },
}
