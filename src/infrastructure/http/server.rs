//! HTTP Server
//!
//! 启动控制器：绑定端口（端口被占用时递增重试）、挂载实时组件、通知就绪、关闭。
//!
//! 状态: `Idle -> Binding -> Listening -> Closed`，`Binding` 在端口冲突时原地重试。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::{cors_preflight_middleware, error_logging_middleware};
use super::routes::create_routes;
use super::state::AppState;
use crate::application::{ApplicationError, PublishFileResponse};
use crate::config::StaticFilesConfig;
use crate::infrastructure::realtime::{
    RealtimeContext, RealtimeFactory, RealtimeOptions, RealtimeServer,
};

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 只在第一次绑定时生效的端口覆盖值
    pub port_override: Option<u16>,
    /// None 表示端口冲突时无限重试
    pub max_bind_attempts: Option<u32>,
    pub static_files: Option<StaticFilesConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            port_override: None,
            max_bind_attempts: None,
            static_files: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// 第一次绑定使用的端口
    pub fn initial_port(&self) -> u16 {
        self.port_override.unwrap_or(self.port)
    }

    pub fn addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

impl From<&crate::config::ServerConfig> for ServerConfig {
    fn from(config: &crate::config::ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            port_override: config.port_override,
            max_bind_attempts: config.max_bind_attempts,
            static_files: config
                .static_files
                .enabled
                .then(|| config.static_files.clone()),
        }
    }
}

/// 启动控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Idle,
    Binding,
    Listening,
    Closed,
}

impl std::fmt::Display for ServerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServerPhase::Idle => "idle",
            ServerPhase::Binding => "binding",
            ServerPhase::Listening => "listening",
            ServerPhase::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// 绑定进度，只由启动控制器修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerBindState {
    /// 递增的基准端口：从配置端口开始，每次冲突加一；绑定成功后为实际端口
    pub target_port: u16,
    /// 已尝试次数
    pub attempts: u32,
}

/// 启动控制器错误
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No free port found after {attempts} attempts (last tried {last_port})")]
    PortsExhausted { last_port: u16, attempts: u32 },

    #[error("Invalid server state: expected {expected}, found {actual}")]
    InvalidState {
        expected: ServerPhase,
        actual: ServerPhase,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// 监听中的资源
struct Running {
    local_addr: SocketAddr,
    realtime: Arc<dyn RealtimeServer>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
    realtime_options: RealtimeOptions,
    realtime_factory: Option<RealtimeFactory>,
    phase: ServerPhase,
    bind_state: ServerBindState,
    running: Option<Running>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(
        config: ServerConfig,
        state: AppState,
        realtime_options: RealtimeOptions,
        realtime_factory: RealtimeFactory,
    ) -> Self {
        let bind_state = ServerBindState {
            target_port: config.port,
            attempts: 0,
        };
        Self {
            config,
            state: Arc::new(state),
            realtime_options,
            realtime_factory: Some(realtime_factory),
            phase: ServerPhase::Idle,
            bind_state,
            running: None,
        }
    }

    pub fn phase(&self) -> ServerPhase {
        self.phase
    }

    pub fn bind_state(&self) -> ServerBindState {
        self.bind_state
    }

    /// 已绑定的地址，监听前为 None
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    pub fn port(&self) -> Option<u16> {
        self.local_addr().map(|addr| addr.port())
    }

    /// 共享应用状态
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn realtime(&self) -> Option<Arc<dyn RealtimeServer>> {
        self.running.as_ref().map(|r| r.realtime.clone())
    }

    /// 发布一个生成文件，返回下载路径和大小
    pub async fn add_file(
        &self,
        path: impl Into<PathBuf>,
    ) -> Result<PublishFileResponse, ApplicationError> {
        self.state.add_file(path).await
    }

    /// 启动服务器
    ///
    /// 绑定成功后构造实时组件、开始处理请求，然后调用一次 `on_ready`。
    pub async fn start<F>(&mut self, on_ready: F) -> Result<SocketAddr, ServerError>
    where
        F: FnOnce(SocketAddr),
    {
        self.expect_phase(ServerPhase::Idle)?;
        self.phase = ServerPhase::Binding;

        let listener = match self.bind_with_retry().await {
            Ok(listener) => listener,
            Err(e) => {
                self.phase = ServerPhase::Idle;
                return Err(e);
            }
        };

        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.phase = ServerPhase::Idle;
                return Err(ServerError::Serve(e));
            }
        };

        let Some(factory) = self.realtime_factory.take() else {
            self.phase = ServerPhase::Idle;
            return Err(ServerError::InvalidState {
                expected: ServerPhase::Idle,
                actual: ServerPhase::Closed,
            });
        };
        let realtime = factory(RealtimeContext {
            options: self.realtime_options.clone(),
            local_addr,
            state: self.state.clone(),
        });

        let router = self.build_router(realtime.routes());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        self.running = Some(Running {
            local_addr,
            realtime,
            shutdown_tx,
            task,
        });
        self.phase = ServerPhase::Listening;

        info!(
            "HTTP server listening on {} (attempts: {})",
            local_addr, self.bind_state.attempts
        );
        self.state.event_publisher.publish_listening(local_addr.port());
        on_ready(local_addr);

        Ok(local_addr)
    }

    /// 关闭服务器：先关闭实时组件，再关闭监听 socket
    pub async fn close(&mut self) -> Result<(), ServerError> {
        self.expect_phase(ServerPhase::Listening)?;

        let Some(running) = self.running.take() else {
            return Err(ServerError::InvalidState {
                expected: ServerPhase::Listening,
                actual: self.phase,
            });
        };

        running.realtime.close().await;

        let _ = running.shutdown_tx.send(());
        match running.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "HTTP server stopped with error"),
            Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
        }

        self.phase = ServerPhase::Closed;
        self.state.event_publisher.publish_closed();
        info!("HTTP server on {} closed", running.local_addr);

        Ok(())
    }

    fn expect_phase(&self, expected: ServerPhase) -> Result<(), ServerError> {
        if self.phase != expected {
            return Err(ServerError::InvalidState {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// 绑定端口，端口被占用时递增重试
    ///
    /// 第一次尝试使用覆盖端口（如有），之后从配置端口开始递增
    async fn bind_with_retry(&mut self) -> Result<TcpListener, ServerError> {
        self.bind_state = ServerBindState {
            target_port: self.config.port,
            attempts: 0,
        };

        loop {
            self.bind_state.attempts += 1;
            let port = if self.bind_state.attempts == 1 {
                self.config.initial_port()
            } else {
                self.bind_state.target_port
            };
            let addr = self.config.addr(port);

            match TcpListener::bind(&addr).await {
                Ok(listener) => {
                    self.bind_state.target_port = port;
                    return Ok(listener);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                    tracing::warn!(port, "Port {} in use, retrying with next port", port);

                    let exhausted = ServerError::PortsExhausted {
                        last_port: port,
                        attempts: self.bind_state.attempts,
                    };
                    if let Some(max) = self.config.max_bind_attempts {
                        if self.bind_state.attempts >= max {
                            return Err(exhausted);
                        }
                    }
                    self.bind_state.target_port =
                        self.bind_state.target_port.checked_add(1).ok_or(exhausted)?;
                }
                Err(e) => return Err(ServerError::Bind { addr, source: e }),
            }
        }
    }

    /// 构建 Router
    fn build_router(&self, realtime_routes: Router) -> Router {
        // 命名空间只来自应用状态，与发布时生成的 download_path 一致
        let mut router = create_routes(&self.state.download_namespace)
            .with_state(self.state.clone())
            .merge(realtime_routes);

        if let Some(static_files) = &self.config.static_files {
            router = router
                .nest_service(&static_files.dist_path, ServeDir::new(&static_files.dist_dir))
                .fallback_service(ServeDir::new(&static_files.base_dir));
        }

        router
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(middleware::from_fn(cors_preflight_middleware))
            .layer(TraceLayer::new_for_http())
    }
}
