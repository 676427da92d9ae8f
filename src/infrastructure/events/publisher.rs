//! Event Publisher Implementation
//!
//! 服务器事件的订阅/取消订阅。每个订阅者独占一条 broadcast 通道，
//! 取消订阅只影响对应 ID 的订阅者。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// 服务器事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// 监听成功
    Listening { port: u16 },
    /// 发布了新的可下载文件
    FileAdded {
        id: String,
        download_path: String,
        size: u64,
    },
    /// 实时组件转发的事件
    Realtime {
        name: String,
        data: serde_json::Value,
        at: DateTime<Utc>,
    },
    /// 服务器关闭
    Closed,
}

/// 订阅 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一个订阅
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: broadcast::Receiver<ServerEvent>,
}

/// 事件发布器
pub struct EventPublisher {
    subscribers: DashMap<SubscriptionId, broadcast::Sender<ServerEvent>>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriptionId(Uuid::new_v4());
        let (tx, rx) = broadcast::channel(self.capacity);
        self.subscribers.insert(id, tx);
        tracing::debug!(subscription_id = %id, "Event subscriber added");
        Subscription { id, receiver: rx }
    }

    /// 取消订阅，返回该订阅是否存在
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription_id = %id, "Event subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// 发布事件到所有订阅者
    pub fn publish(&self, event: ServerEvent) {
        let mut stale = Vec::new();
        for entry in self.subscribers.iter() {
            if entry.value().send(event.clone()).is_err() {
                stale.push(*entry.key());
            }
        }
        // 接收端已释放的订阅者
        for id in stale {
            self.subscribers.remove(&id);
            tracing::debug!(subscription_id = %id, "Dropped subscriber with closed receiver");
        }
    }

    pub fn publish_listening(&self, port: u16) {
        self.publish(ServerEvent::Listening { port });
    }

    pub fn publish_file_added(&self, id: &str, download_path: &str, size: u64) {
        self.publish(ServerEvent::FileAdded {
            id: id.to_string(),
            download_path: download_path.to_string(),
            size,
        });
    }

    pub fn publish_realtime(&self, name: &str, data: serde_json::Value) {
        self.publish(ServerEvent::Realtime {
            name: name.to_string(),
            data,
            at: Utc::now(),
        });
    }

    pub fn publish_closed(&self) {
        self.publish(ServerEvent::Closed);
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
