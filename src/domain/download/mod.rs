//! Download Context - 下载限界上下文
//!
//! 职责:
//! - 由生成文件的绝对路径推导下载 ID
//! - 拼装对外的下载路径

mod errors;
mod value_objects;

pub use errors::DownloadError;
pub use value_objects::{FileId, FileRecord};
