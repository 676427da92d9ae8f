//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                       GET   健康检查
//! - /api/v1/speech                  POST  两遍语音合成（音频 + 标记）
//! - /<namespace>/downloads/<id>     GET   下载已发布文件
//!
//! 静态目录与实时组件路由由启动控制器挂载。

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(download_namespace: &str) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route(
            &format!("/{}/downloads/*file_id", download_namespace),
            get(handlers::download_file),
        )
        // 空 ID 同样走下载处理，返回 `no file: `
        .route(
            &format!("/{}/downloads/", download_namespace),
            get(handlers::download_file),
        )
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/v1/speech", post(handlers::synthesize_speech))
}
