//! Download Handler
//!
//! `GET /<namespace>/downloads/<id>`：按 ID 流式返回已发布文件

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{ApplicationError, ResolveDownload};
use crate::domain::download::FileId;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 下载已发布的文件
///
/// 未知 ID、空 ID 或文件已被删除时返回 404 `no file: <id>`
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    file_id: Option<Path<String>>,
) -> Result<Response, ApiError> {
    let file_id = file_id.map(|Path(id)| id).unwrap_or_default();
    let record = state
        .resolve_download_handler
        .handle(ResolveDownload {
            file_id: FileId::new(file_id.clone()),
        })
        .map_err(|e| match e {
            ApplicationError::NotFound { id, .. } => ApiError::FileNotFound(id),
            other => ApiError::Internal(other.to_string()),
        })?;

    // 给编码进程留出把文件落盘的时间
    if !state.download_delay.is_zero() {
        tokio::time::sleep(state.download_delay).await;
    }

    let file = match tokio::fs::File::open(&record.path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                file_id = %record.id,
                path = %record.path.display(),
                "Published file no longer exists"
            );
            return Err(ApiError::FileNotFound(file_id));
        }
        Err(e) => {
            return Err(ApiError::Internal(format!(
                "Failed to open {}: {}",
                record.path.display(),
                e
            )))
        }
    };

    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?
        .len();

    let content_type = content_type_for(&record.path);

    tracing::debug!(
        file_id = %record.id,
        path = %record.path.display(),
        size = file_size,
        "Serving download"
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, file_size.to_string()),
        ],
        body,
    )
        .into_response())
}

/// 按扩展名推断 Content-Type
fn content_type_for(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("gif") => "image/gif",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path as StdPath;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_for(StdPath::new("/o/clip.mp4")), "video/mp4");
        assert_eq!(content_type_for(StdPath::new("/o/clip.WEBM")), "video/webm");
        assert_eq!(content_type_for(StdPath::new("/o/anim.gif")), "image/gif");
        assert_eq!(content_type_for(StdPath::new("/o/noext")), "application/octet-stream");
    }
}
