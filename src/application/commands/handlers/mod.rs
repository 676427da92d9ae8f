//! Command Handlers 实现

mod file_handlers;
mod speech_handlers;

pub use file_handlers::*;
pub use speech_handlers::*;
