//! 通知触发
//!
//! The core only decides *who* is told *what*; delivery is the subscriber's
//! business. [`BroadcastNotifier`] fans events out over a tokio broadcast
//! channel and never blocks the caller.

use serde::Serialize;
use shared::models::Scope;
use tokio::sync::broadcast;

/// Workflow event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    OrderCreated,
    OrderQueued,
    OrderReady,
    OrderCancelled,
    OrderPaid,
    ModificationPending,
    SessionPaid,
}

/// One notification addressed to a console
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub scope: Scope,
    pub event: NotificationEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    pub session_id: u64,
}

impl Notification {
    pub fn order(scope: Scope, event: NotificationEvent, order_id: u64, session_id: u64) -> Self {
        Self {
            scope,
            event,
            order_id: Some(order_id),
            session_id,
        }
    }

    pub fn session(scope: Scope, event: NotificationEvent, session_id: u64) -> Self {
        Self {
            scope,
            event,
            order_id: None,
            session_id,
        }
    }
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Broadcast-channel notifier
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(
            scope = %notification.scope,
            event = ?notification.event,
            order_id = ?notification.order_id,
            session_id = notification.session_id,
            "Notification"
        );
        // 无订阅者时发送失败，忽略
        let _ = self.tx.send(notification);
    }
}
