//! Speech Context - 语音限界上下文
//!
//! 职责:
//! - 语音请求校验
//! - 时间标记（word / sentence）流解析

mod errors;
mod marks;
mod value_objects;

pub use errors::SpeechError;
pub use marks::{parse_marks, MarkEntry, MarkType};
pub use value_objects::{SpeechRequest, VoiceId};
