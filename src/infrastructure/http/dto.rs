//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::SynthesizeSpeechResponse;
use crate::domain::speech::MarkEntry;

// ============================================================================
// Speech DTOs
// ============================================================================

/// `POST /api/v1/speech` 请求体（JSON 或表单）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequestBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioData {
    pub file_content: String,
}

/// 成功响应: `{ audioData: { fileContent }, markData: [...] }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub audio_data: AudioData,
    pub mark_data: Vec<MarkEntry>,
}

impl From<SynthesizeSpeechResponse> for SpeechResponse {
    fn from(result: SynthesizeSpeechResponse) -> Self {
        Self {
            audio_data: AudioData {
                file_content: result.file_content,
            },
            mark_data: result.mark_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let body: SpeechRequestBody =
            serde_json::from_str(r#"{"text":"Hi.","voiceId":"Joanna"}"#).unwrap();
        assert_eq!(body.text, "Hi.");
        assert_eq!(body.voice_id, "Joanna");
    }

    #[test]
    fn test_response_shape() {
        let response = SpeechResponse {
            audio_data: AudioData {
                file_content: "QQ==".into(),
            },
            mark_data: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["audioData"]["fileContent"], "QQ==");
        assert!(json["markData"].as_array().unwrap().is_empty());
    }
}
