//! Speech Handler
//!
//! `POST /api/v1/speech`：请求体可以是 JSON，也可以是 urlencoded 表单

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::header,
    Form, Json,
};
use std::sync::Arc;

use crate::application::SynthesizeSpeech;
use crate::infrastructure::http::dto::{SpeechRequestBody, SpeechResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 按 Content-Type 解析的语音请求体
#[derive(Debug)]
pub struct SpeechBody(pub SpeechRequestBody);

#[async_trait]
impl<S> FromRequest<S> for SpeechBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(body) = Form::<SpeechRequestBody>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Speech(e.body_text()))?;
            Ok(SpeechBody(body))
        } else {
            let Json(body) = Json::<SpeechRequestBody>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Speech(e.body_text()))?;
            Ok(SpeechBody(body))
        }
    }
}

/// 合成语音并返回 base64 音频和标记
pub async fn synthesize_speech(
    State(state): State<Arc<AppState>>,
    SpeechBody(body): SpeechBody,
) -> Result<Json<SpeechResponse>, ApiError> {
    let command = SynthesizeSpeech {
        text: body.text,
        voice_id: body.voice_id,
    };

    let result = state
        .synthesize_speech_handler
        .handle(command)
        .await
        .map_err(ApiError::speech)?;

    Ok(Json(result.into()))
}
