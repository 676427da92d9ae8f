//! File Commands - 发布可下载文件

use std::path::PathBuf;

/// 发布文件命令
#[derive(Debug, Clone)]
pub struct PublishFile {
    /// 生成文件的绝对路径
    pub path: PathBuf,
}

/// 发布结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFileResponse {
    /// 对外下载路径，如 `/frameencoder/downloads/clip123.mp4`
    pub download_path: String,
    pub size_in_bytes: u64,
}
