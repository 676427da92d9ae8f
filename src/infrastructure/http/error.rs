//! HTTP Error Handling

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 语音接口错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// 下载未命中：404 + 纯文本
    FileNotFound(String),
    /// 语音接口失败：200 + `{"error": ...}`（兼容既有调用方）
    Speech(String),
    /// 其他内部错误：500 + 纯文本
    Internal(String),
}

impl ApiError {
    /// 语音接口的错误消息：远程错误只回传错误码
    pub fn speech(err: ApplicationError) -> Self {
        match err {
            ApplicationError::RemoteSynthesis { code, .. } => ApiError::Speech(code),
            other => ApiError::Speech(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::FileNotFound(id) => {
                tracing::debug!(file_id = %id, "Download miss");
                (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    format!("no file: {}", id),
                )
                    .into_response()
            }
            ApiError::Speech(msg) => {
                tracing::warn!(error = %msg, "Speech request failed");
                (StatusCode::OK, Json(ErrorResponse { error: msg })).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    msg,
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_exposes_code_only() {
        let err = ApiError::speech(ApplicationError::RemoteSynthesis {
            code: "ThrottlingException".into(),
            message: "Rate exceeded".into(),
        });
        assert!(matches!(err, ApiError::Speech(ref msg) if msg == "ThrottlingException"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::FileNotFound("a.mp4".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Speech("x".into()).into_response().status(), StatusCode::OK);
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
