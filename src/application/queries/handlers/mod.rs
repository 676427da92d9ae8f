//! Query Handlers 实现

mod download_handlers;

pub use download_handlers::*;
