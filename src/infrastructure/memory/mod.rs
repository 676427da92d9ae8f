//! Memory Layer - In-Memory State Management
//!
//! 文件注册表的内存实现，不跨进程重启保留

mod file_registry;

pub use file_registry::InMemoryFileRegistry;
