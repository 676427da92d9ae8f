//! Event Socket - 默认实时组件
//!
//! `GET /ws/events`：把服务器事件以 JSON 推送给客户端；
//! 客户端发来的 `{"event": "...", "data": ...}` 作为 Realtime 事件重新发布。

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

use super::{RealtimeContext, RealtimeFactory, RealtimeOptions, RealtimeServer};
use crate::infrastructure::events::EventPublisher;

/// 客户端上行消息
#[derive(Debug, Deserialize)]
struct ClientEvent {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

struct Shared {
    events: Arc<EventPublisher>,
    shutdown: watch::Receiver<bool>,
}

/// 基于 WebSocket 的事件通道
pub struct EventSocketServer {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    options: RealtimeOptions,
}

impl EventSocketServer {
    pub fn new(context: RealtimeContext) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tracing::info!(
            addr = %context.local_addr,
            video_dir = %context.options.video_dir.display(),
            frame_dir = %context.options.frame_dir.display(),
            keep_frames = context.options.keep_frames,
            "Realtime event socket attached"
        );
        Self {
            shared: Arc::new(Shared {
                events: context.state.event_publisher.clone(),
                shutdown: shutdown_rx,
            }),
            shutdown_tx,
            options: context.options,
        }
    }

    pub fn factory() -> RealtimeFactory {
        Box::new(|context| Arc::new(EventSocketServer::new(context)) as Arc<dyn RealtimeServer>)
    }

    pub fn options(&self) -> &RealtimeOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

#[async_trait]
impl RealtimeServer for EventSocketServer {
    fn routes(&self) -> Router {
        Router::new()
            .route("/ws/events", get(event_socket_handler))
            .with_state(self.shared.clone())
    }

    async fn close(&self) {
        self.shutdown_tx.send_replace(true);
        tracing::info!("Realtime event socket closed");
    }
}

async fn event_socket_handler(
    ws: WebSocketUpgrade,
    State(shared): State<Arc<Shared>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, shared))
}

async fn handle_socket(socket: WebSocket, shared: Arc<Shared>) {
    if *shared.shutdown.borrow() {
        return;
    }

    let (mut sender, mut receiver) = socket.split();
    let mut subscription = shared.events.subscribe();
    let subscription_id = subscription.id;
    let mut shutdown = shared.shutdown.clone();

    tracing::info!(subscription_id = %subscription_id, "Event socket connected");

    // 事件转发任务
    let mut forward_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = subscription.receiver.recv() => {
                    let event = match event {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Event socket lagging, events dropped");
                            continue;
                        }
                        Err(_) => break,
                    };
                    let msg = match serde_json::to_string(&event) {
                        Ok(json) => Message::Text(json),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if let Err(e) = sender.send(msg).await {
                        tracing::debug!(error = %e, "Failed to send event socket message");
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // 接收客户端消息
    let events = shared.events.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(client_event) => events.publish_realtime(&client_event.event, client_event.data),
                    Err(e) => tracing::debug!(error = %e, "Ignoring malformed client event"),
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Event socket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Event socket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成，另一个随之终止
    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    shared.events.unsubscribe(subscription_id);
    tracing::info!(subscription_id = %subscription_id, "Event socket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SpeechSynthesizerPort;
    use crate::infrastructure::adapters::FakeSpeechClient;
    use crate::infrastructure::http::{AppState, StateSettings};
    use crate::infrastructure::memory::InMemoryFileRegistry;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::path::PathBuf;
    use tower::util::ServiceExt;

    fn context() -> RealtimeContext {
        let synthesizer: Arc<dyn SpeechSynthesizerPort> = Arc::new(FakeSpeechClient::with_defaults());
        let state = AppState::new(
            InMemoryFileRegistry::new().arc(),
            synthesizer.clone(),
            EventPublisher::new().arc(),
            StateSettings::default(),
        );
        RealtimeContext {
            options: RealtimeOptions {
                video_dir: PathBuf::from("output"),
                frame_dir: PathBuf::from("frames"),
                keep_frames: true,
                allow_arbitrary_arguments: false,
                synthesizer,
            },
            local_addr: "127.0.0.1:8080".parse().unwrap(),
            state: Arc::new(state),
        }
    }

    #[tokio::test]
    async fn test_close_marks_server_closed() {
        let server = EventSocketServer::new(context());
        assert!(server.options().keep_frames);
        assert!(!server.is_closed());

        server.close().await;
        assert!(server.is_closed());
    }

    #[tokio::test]
    async fn test_plain_get_is_not_upgraded() {
        let server = EventSocketServer::factory()(context());
        let response = server
            .routes()
            .oneshot(Request::builder().uri("/ws/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::OK);
    }
}
