//! HTTP Speech Client - 调用 Polly 兼容的语音合成网关
//!
//! 实现 SpeechSynthesizerPort trait
//!
//! 外部 API:
//! POST {base_url}/v1/speech
//! Request: {"Text": "...", "VoiceId": "Joanna", "OutputFormat": "mp3|json", "SpeechMarkTypes": [...]}
//! Response: 数据体为音频或 JSON Lines 标记，Content-Type 标明类型
//! 错误: 非 2xx，错误码来自 x-amzn-ErrorType 头或 JSON body 的 __type / code

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    AudioStream, SpeechSynthesizerPort, SynthesisError, SynthesisOutput, SynthesisParams,
};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechHttpRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    output_format: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    speech_mark_types: Vec<&'static str>,
}

/// HTTP 语音客户端配置
#[derive(Debug, Clone)]
pub struct HttpSpeechClientConfig {
    /// 网关基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSpeechClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpSpeechClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 语音客户端
pub struct HttpSpeechClient {
    client: Client,
    config: HttpSpeechClientConfig,
}

impl HttpSpeechClient {
    pub fn new(config: HttpSpeechClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn speech_url(&self) -> String {
        format!("{}/v1/speech", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Timeout
    } else if e.is_connect() {
        SynthesisError::NetworkError(format!("Cannot connect to speech service: {}", e))
    } else {
        SynthesisError::NetworkError(e.to_string())
    }
}

/// 从错误响应中提取远程错误码与描述
fn remote_error(status: StatusCode, error_type: Option<&str>, body: &str) -> SynthesisError {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();

    // "TextLengthExceededException:http://internal.amazon.com/..." -> 冒号前部分
    let from_header = error_type
        .map(|v| v.split(':').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty());

    // "com.amazonaws.polly#InvalidSsmlException" -> # 后部分
    let from_body = json.as_ref().and_then(|j| {
        j.get("__type")
            .or_else(|| j.get("code"))
            .and_then(|v| v.as_str())
            .map(|v| v.rsplit('#').next().unwrap_or(v).to_string())
    });

    let code = from_header
        .or(from_body)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let message = json
        .as_ref()
        .and_then(|j| j.get("message").or_else(|| j.get("Message")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    SynthesisError::Remote { code, message }
}

#[async_trait]
impl SpeechSynthesizerPort for HttpSpeechClient {
    async fn synthesize(&self, params: SynthesisParams) -> Result<SynthesisOutput, SynthesisError> {
        let body = SpeechHttpRequest {
            text: &params.text,
            voice_id: &params.voice_id,
            output_format: params.output_format.as_str(),
            speech_mark_types: params.speech_mark_types.iter().map(|t| t.as_str()).collect(),
        };

        tracing::debug!(
            url = %self.speech_url(),
            text_len = params.text.len(),
            voice_id = %params.voice_id,
            output_format = params.output_format.as_str(),
            "Sending speech request"
        );

        let response = self
            .client
            .post(self.speech_url())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_type = response
                .headers()
                .get("x-amzn-ErrorType")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_text = response.text().await.unwrap_or_default();
            return Err(remote_error(status, error_type.as_deref(), &error_text));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let stream = response.bytes_stream().map(|chunk| chunk.map_err(map_reqwest_error));

        Ok(SynthesisOutput {
            content_type,
            audio_stream: Some(AudioStream::Stream(stream.boxed())),
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
