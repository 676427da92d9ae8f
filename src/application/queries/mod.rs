//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：下载解析

mod download_queries;

pub mod handlers;

pub use download_queries::*;
