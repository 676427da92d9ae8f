//! Events - 服务器事件发布

mod publisher;

pub use publisher::{EventPublisher, ServerEvent, Subscription, SubscriptionId};
