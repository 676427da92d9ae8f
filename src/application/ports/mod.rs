//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod file_registry;
mod speech_synthesizer;

pub use file_registry::FileRegistryPort;
pub use speech_synthesizer::{
    AudioStream, OutputFormat, SpeechSynthesizerPort, SynthesisError, SynthesisOutput,
    SynthesisParams,
};
