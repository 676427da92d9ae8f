//! Download Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("路径没有文件名部分: {0}")]
    MissingFileName(String),

    #[error("文件名不是合法的 UTF-8: {0}")]
    NonUtf8FileName(String),

    #[error("无效的下载命名空间: {0}")]
    InvalidNamespace(String),
}
