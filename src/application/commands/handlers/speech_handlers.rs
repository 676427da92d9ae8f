//! Speech Command Handlers
//!
//! 两遍合成：
//! 1. 请求音频，流式写入本请求独占的临时文件
//! 2. 读回临时文件并 base64 编码
//! 3. 对同一文本请求 word / sentence 标记
//! 4. 返回 `{ audioData, markData }`
//! 5. 无论成败都删除临时文件

use base64::Engine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::application::commands::{SynthesizeSpeech, SynthesizeSpeechResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{SpeechSynthesizerPort, SynthesisError, SynthesisParams};
use crate::domain::speech::{parse_marks, MarkEntry, SpeechRequest};

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    scratch_dir: PathBuf,
}

impl SynthesizeSpeechHandler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            synthesizer,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// 本次请求的临时音频路径
    fn temp_path(&self, request_id: Uuid) -> PathBuf {
        self.scratch_dir.join(format!("speech-{}.mp3", request_id))
    }

    pub async fn handle(
        &self,
        command: SynthesizeSpeech,
    ) -> Result<SynthesizeSpeechResponse, ApplicationError> {
        let request = SpeechRequest::new(command.text, command.voice_id)?;

        let request_id = Uuid::new_v4();
        let temp_path = self.temp_path(request_id);

        tracing::debug!(
            request_id = %request_id,
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            "Speech synthesis started"
        );

        let result = self.run(&request, &temp_path).await;
        remove_temp_file(&temp_path).await;

        match &result {
            Ok(response) => tracing::info!(
                request_id = %request_id,
                marks = response.mark_data.len(),
                "Speech synthesis completed"
            ),
            Err(e) => tracing::warn!(
                request_id = %request_id,
                error = %e,
                "Speech synthesis failed"
            ),
        }

        result
    }

    async fn run(
        &self,
        request: &SpeechRequest,
        temp_path: &Path,
    ) -> Result<SynthesizeSpeechResponse, ApplicationError> {
        let audio = self
            .synthesizer
            .synthesize(SynthesisParams::audio(request))
            .await?
            .into_audio()?;

        write_temp_file(temp_path, audio.into_reader()).await?;

        let file_content = read_base64(temp_path).await?;
        let mark_data = self.request_marks(request).await?;

        Ok(SynthesizeSpeechResponse {
            file_content,
            mark_data,
        })
    }

    async fn request_marks(&self, request: &SpeechRequest) -> Result<Vec<MarkEntry>, ApplicationError> {
        let raw = self
            .synthesizer
            .synthesize(SynthesisParams::marks(request))
            .await?
            .into_marks()?
            .collect()
            .await?;

        Ok(parse_marks(&raw)?)
    }
}

/// 将数据流拷贝到文件，不在内存中保留第二份完整缓冲
async fn write_temp_file(
    path: &Path,
    mut reader: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
) -> Result<(), ApplicationError> {
    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        ApplicationError::local_io(format!("Failed to create {}: {}", path.display(), e))
    })?;

    if let Err(e) = tokio::io::copy(&mut reader, &mut file).await {
        // 读端是远程流：把远程错误原样还原
        if let Some(inner) = e.get_ref().and_then(|inner| inner.downcast_ref::<SynthesisError>()) {
            return Err(ApplicationError::RemoteSynthesis {
                code: inner.code().to_string(),
                message: inner.to_string(),
            });
        }
        return Err(ApplicationError::local_io(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }

    file.flush().await.map_err(|e| {
        ApplicationError::local_io(format!("Failed to flush {}: {}", path.display(), e))
    })?;

    Ok(())
}

async fn read_base64(path: &Path) -> Result<String, ApplicationError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        ApplicationError::local_io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(base64::engine::general_purpose::STANDARD.encode(data))
}

/// 删除临时文件；失败只记日志
async fn remove_temp_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Temp speech file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove temp speech file"
        ),
    }
}
