//! Speech Commands - 语音合成

use crate::domain::speech::MarkEntry;

/// 合成语音命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    pub voice_id: String,
}

/// 合成结果：音频与时间标记成对返回
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechResponse {
    /// base64 编码的音频
    pub file_content: String,
    /// 按源顺序排列的标记
    pub mark_data: Vec<MarkEntry>,
}
