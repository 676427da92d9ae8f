//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：发布文件、合成语音

mod file_commands;
mod speech_commands;

pub mod handlers;

pub use file_commands::*;
pub use speech_commands::*;
