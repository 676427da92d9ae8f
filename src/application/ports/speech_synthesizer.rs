//! Speech Synthesizer Port - 远程语音合成能力抽象
//!
//! 远程服务有两种互斥的输出模式：音频字节，或 JSON Lines 时间标记。
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::domain::speech::{MarkType, SpeechRequest};

/// 远程合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Remote error {code}: {message}")]
    Remote { code: String, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

impl SynthesisError {
    /// 回传给调用方的错误码
    pub fn code(&self) -> &str {
        match self {
            Self::Remote { code, .. } => code,
            Self::NetworkError(_) => "NetworkingError",
            Self::Timeout => "TimeoutError",
            Self::MalformedResult(_) => "MalformedResult",
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 音频（mp3）
    Mp3,
    /// 时间标记（JSON Lines）
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Json => "json",
        }
    }
}

/// 单次合成调用参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisParams {
    pub text: String,
    pub voice_id: String,
    pub output_format: OutputFormat,
    pub speech_mark_types: Vec<MarkType>,
}

impl SynthesisParams {
    /// 第一遍：音频
    pub fn audio(request: &SpeechRequest) -> Self {
        Self {
            text: request.text.clone(),
            voice_id: request.voice_id.as_str().to_string(),
            output_format: OutputFormat::Mp3,
            speech_mark_types: Vec::new(),
        }
    }

    /// 第二遍：同一文本的 word / sentence 标记
    pub fn marks(request: &SpeechRequest) -> Self {
        Self {
            output_format: OutputFormat::Json,
            speech_mark_types: vec![MarkType::Word, MarkType::Sentence],
            ..Self::audio(request)
        }
    }
}

/// 合成结果的数据体
pub enum AudioStream {
    /// 已完整缓冲的数据
    Buffer(Bytes),
    /// 分块到达的数据
    Stream(BoxStream<'static, Result<Bytes, SynthesisError>>),
}

impl AudioStream {
    /// 转为 AsyncRead，便于流式写入文件
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        match self {
            Self::Buffer(bytes) => Box::new(std::io::Cursor::new(bytes)),
            Self::Stream(stream) => Box::new(StreamReader::new(stream.map(|chunk| {
                chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            }))),
        }
    }

    /// 读完全部数据
    pub async fn collect(self) -> Result<Vec<u8>, SynthesisError> {
        match self {
            Self::Buffer(bytes) => Ok(bytes.to_vec()),
            Self::Stream(mut stream) => {
                let mut data = Vec::new();
                while let Some(chunk) = stream.next().await {
                    data.extend_from_slice(&chunk?);
                }
                Ok(data)
            }
        }
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// 单次合成调用的结果
#[derive(Debug)]
pub struct SynthesisOutput {
    pub content_type: Option<String>,
    pub audio_stream: Option<AudioStream>,
}

impl SynthesisOutput {
    pub fn new(content_type: impl Into<String>, data: AudioStream) -> Self {
        Self {
            content_type: Some(content_type.into()),
            audio_stream: Some(data),
        }
    }

    /// 取出音频数据
    ///
    /// 没有数据体，或内容类型明确是文本 / JSON 时视为异常结果；
    /// `application/octet-stream` 等二进制类型按音频处理
    pub fn into_audio(self) -> Result<AudioStream, SynthesisError> {
        if let Some(content_type) = &self.content_type {
            if is_textual(content_type) {
                return Err(SynthesisError::MalformedResult(format!(
                    "expected audio, got {}",
                    content_type
                )));
            }
        }
        self.audio_stream
            .ok_or_else(|| SynthesisError::MalformedResult("result has no audio stream".into()))
    }

    /// 取出标记流数据
    pub fn into_marks(self) -> Result<AudioStream, SynthesisError> {
        if let Some(content_type) = &self.content_type {
            if content_type.starts_with("audio/") {
                return Err(SynthesisError::MalformedResult(format!(
                    "expected speech marks, got {}",
                    content_type
                )));
            }
        }
        self.audio_stream
            .ok_or_else(|| SynthesisError::MalformedResult("result has no mark stream".into()))
    }
}

/// 文本或 JSON 内容类型（忽略参数与大小写）
fn is_textual(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/") || essence.contains("json")
}

/// Speech Synthesizer Port
///
/// 外部 TTS 服务的抽象接口，超时由实现方负责
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    async fn synthesize(&self, params: SynthesisParams) -> Result<SynthesisOutput, SynthesisError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
