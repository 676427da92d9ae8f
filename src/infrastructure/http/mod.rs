//! HTTP Layer - 下载、语音合成、启动控制

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerBindState, ServerConfig, ServerError, ServerPhase};
pub use state::{AppState, StateSettings};
