//! Download Context - Value Objects

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::DownloadError;

/// 下载 ID（即文件的 basename）
///
/// 同名文件共享同一个 ID，后发布者覆盖先发布者。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileId(String);

impl FileId {
    /// 由路径的最后一段推导 ID
    pub fn from_path(path: &Path) -> Result<Self, DownloadError> {
        let name = path
            .file_name()
            .ok_or_else(|| DownloadError::MissingFileName(path.display().to_string()))?;
        let name = name
            .to_str()
            .ok_or_else(|| DownloadError::NonUtf8FileName(path.display().to_string()))?;
        Ok(Self(name.to_string()))
    }

    /// 直接使用请求路径中的 ID（查询用，不做推导）
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 对外下载路径: `/<namespace>/downloads/<id>`
    pub fn download_path(&self, namespace: &str) -> Result<String, DownloadError> {
        if namespace.is_empty() || namespace.contains('/') {
            return Err(DownloadError::InvalidNamespace(namespace.to_string()));
        }
        Ok(format!("/{}/downloads/{}", namespace, self.0))
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 文件注册记录
///
/// 创建后不可变，生命周期与进程相同。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    pub path: PathBuf,
}

impl FileRecord {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        let path = path.into();
        let id = FileId::from_path(&path)?;
        Ok(Self { id, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_basename() {
        let record = FileRecord::from_path("/tmp/out/clip123.mp4").unwrap();
        assert_eq!(record.id.as_str(), "clip123.mp4");
        assert_eq!(record.path, PathBuf::from("/tmp/out/clip123.mp4"));
    }

    #[test]
    fn test_same_basename_same_id() {
        let a = FileRecord::from_path("/a/out.webm").unwrap();
        let b = FileRecord::from_path("/b/c/out.webm").unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_root_has_no_file_name() {
        assert!(matches!(
            FileRecord::from_path("/"),
            Err(DownloadError::MissingFileName(_))
        ));
    }

    #[test]
    fn test_download_path() {
        let id = FileId::new("clip123.mp4");
        assert_eq!(
            id.download_path("frameencoder").unwrap(),
            "/frameencoder/downloads/clip123.mp4"
        );
        assert!(id.download_path("a/b").is_err());
        assert!(id.download_path("").is_err());
    }
}
