//! Fake Speech Client - 用于本地调试的语音客户端
//!
//! 不调用远程服务：音频为固定字节，标记按空白切词生成

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use crate::application::ports::{
    AudioStream, OutputFormat, SpeechSynthesizerPort, SynthesisError, SynthesisOutput,
    SynthesisParams,
};
use crate::domain::speech::MarkType;

/// 每个字符对应的毫秒数
const MS_PER_CHAR: u64 = 60;

/// Fake Speech Client 配置
#[derive(Debug, Clone, Default)]
pub struct FakeSpeechClientConfig {
    /// 固定返回的音频文件，未设置时返回空 mp3 帧头
    pub audio_file_path: Option<PathBuf>,
}

/// Fake Speech Client
pub struct FakeSpeechClient {
    audio_data: Bytes,
}

impl FakeSpeechClient {
    pub fn new(config: FakeSpeechClientConfig) -> Result<Self, std::io::Error> {
        let audio_data = match &config.audio_file_path {
            Some(path) => Bytes::from(std::fs::read(path)?),
            None => Bytes::from_static(b"ID3\x04\x00\x00\x00\x00\x00\x00"),
        };
        tracing::info!(audio_size = audio_data.len(), "FakeSpeechClient initialized");
        Ok(Self { audio_data })
    }

    pub fn with_defaults() -> Self {
        Self {
            audio_data: Bytes::from_static(b"ID3\x04\x00\x00\x00\x00\x00\x00"),
        }
    }

    /// 生成 JSON Lines 标记：整段一条 sentence，每个词一条 word
    fn marks(params: &SynthesisParams) -> String {
        let mut lines = Vec::new();
        let text = params.text.as_str();

        if params.speech_mark_types.contains(&MarkType::Sentence) {
            lines.push(serde_json::json!({
                "time": 0,
                "type": "sentence",
                "start": 0,
                "end": text.len(),
                "value": text,
            }));
        }

        if params.speech_mark_types.contains(&MarkType::Word) {
            let mut offset = 0;
            for word in text.split_whitespace() {
                // split_whitespace 返回的切片都在 text 内
                let start = text[offset..].find(word).map_or(offset, |i| offset + i);
                let end = start + word.len();
                lines.push(serde_json::json!({
                    "time": start as u64 * MS_PER_CHAR,
                    "type": "word",
                    "start": start,
                    "end": end,
                    "value": word,
                }));
                offset = end;
            }
        }

        let mut out = String::new();
        for line in lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeSpeechClient {
    async fn synthesize(&self, params: SynthesisParams) -> Result<SynthesisOutput, SynthesisError> {
        tracing::debug!(
            text_len = params.text.len(),
            voice_id = %params.voice_id,
            output_format = params.output_format.as_str(),
            "FakeSpeechClient: returning canned result"
        );

        match params.output_format {
            OutputFormat::Mp3 => Ok(SynthesisOutput::new(
                "audio/mpeg",
                AudioStream::Buffer(self.audio_data.clone()),
            )),
            OutputFormat::Json => Ok(SynthesisOutput::new(
                "application/x-json-stream",
                AudioStream::Buffer(Bytes::from(Self::marks(&params))),
            )),
        }
    }
}
