//! Realtime Layer - 与 HTTP 服务共用监听端口的实时组件
//!
//! 端口绑定成功后由启动控制器通过工厂构造，路由挂到同一个监听 socket 上；
//! 关闭时先于 HTTP 服务关闭。

mod event_socket;

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::SpeechSynthesizerPort;
use crate::infrastructure::http::AppState;

pub use event_socket::EventSocketServer;

/// 实时组件构造参数
#[derive(Clone)]
pub struct RealtimeOptions {
    pub video_dir: PathBuf,
    pub frame_dir: PathBuf,
    pub keep_frames: bool,
    pub allow_arbitrary_arguments: bool,
    pub synthesizer: Arc<dyn SpeechSynthesizerPort>,
}

impl std::fmt::Debug for RealtimeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeOptions")
            .field("video_dir", &self.video_dir)
            .field("frame_dir", &self.frame_dir)
            .field("keep_frames", &self.keep_frames)
            .field("allow_arbitrary_arguments", &self.allow_arbitrary_arguments)
            .finish_non_exhaustive()
    }
}

/// 构造实时组件时可用的上下文
pub struct RealtimeContext {
    pub options: RealtimeOptions,
    /// 已绑定的本地地址
    pub local_addr: SocketAddr,
    /// 服务器状态句柄（发布文件、事件订阅）
    pub state: Arc<AppState>,
}

/// 实时组件
#[async_trait]
pub trait RealtimeServer: Send + Sync {
    /// 挂载到监听 socket 上的路由
    fn routes(&self) -> Router;

    /// 关闭实时组件
    async fn close(&self);
}

/// 实时组件工厂，只在绑定成功后调用一次
pub type RealtimeFactory = Box<dyn FnOnce(RealtimeContext) -> Arc<dyn RealtimeServer> + Send>;
