//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SpeechError;

/// 远程语音的音色 ID（如 "Joanna"）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, SpeechError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SpeechError::EmptyVoice);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语音合成请求，不落盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: VoiceId,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Result<Self, SpeechError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        Ok(Self {
            text,
            voice_id: VoiceId::new(voice_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = SpeechRequest::new("Hi.", "Joanna").unwrap();
        assert_eq!(req.text, "Hi.");
        assert_eq!(req.voice_id.as_str(), "Joanna");
    }

    #[test]
    fn test_blank_fields_rejected() {
        assert!(matches!(SpeechRequest::new("  ", "Joanna"), Err(SpeechError::EmptyText)));
        assert!(matches!(SpeechRequest::new("Hi.", ""), Err(SpeechError::EmptyVoice)));
    }
}
