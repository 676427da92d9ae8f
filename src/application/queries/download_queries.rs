//! Download Queries - 下载查询

use crate::domain::download::FileId;

/// 按 ID 解析已发布文件
#[derive(Debug, Clone)]
pub struct ResolveDownload {
    pub file_id: FileId,
}
