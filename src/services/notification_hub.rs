use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::database::models::{Notification, NotificationType};

/// Channel sender half for pushing JSON text to one WebSocket connection.
pub type PushSender = mpsc::UnboundedSender<String>;

/// Event pushed over the socket.
#[derive(Debug, Clone, Serialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub event_type: NotificationType,
    pub message: String,
    pub data: serde_json::Value,
}

impl From<&Notification> for PushEvent {
    fn from(notification: &Notification) -> Self {
        Self {
            event_type: notification.notification_type,
            message: notification.message.clone(),
            data: notification.data.clone(),
        }
    }
}

struct Connection {
    user_id: i64,
    sender: PushSender,
    connected_at: DateTime<Utc>,
}

/// Live WebSocket connections keyed by connection id.
///
/// A user may hold several connections (one per tab); pushes go to all of
/// them. Delivery is best effort: closed channels are skipped and nothing
/// is queued for users who are offline.
#[derive(Default)]
pub struct NotificationHub {
    connections: RwLock<HashMap<Uuid, Connection>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns its id plus the receiving half of its channel.
    pub async fn add(&self, user_id: i64) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        self.connections.write().await.insert(
            conn_id,
            Connection {
                user_id,
                sender: tx,
                connected_at: Utc::now(),
            },
        );
        log::debug!("WebSocket connection {} opened for user {}", conn_id, user_id);
        (conn_id, rx)
    }

    /// Drops a connection and returns how long it was open.
    pub async fn remove(&self, conn_id: &Uuid) -> Option<TimeDelta> {
        let conn = self.connections.write().await.remove(conn_id)?;
        let open_for = Utc::now().signed_duration_since(conn.connected_at);
        log::debug!(
            "WebSocket connection {} closed for user {} after {}s",
            conn_id,
            conn.user_id,
            open_for.num_seconds()
        );
        Some(open_for)
    }

    /// Sends `event` to every connection of `user_id`.
    ///
    /// Returns the number of connections that accepted the message.
    pub async fn send_to_user(&self, user_id: i64, event: &PushEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to serialize push event: {}", e);
                return 0;
            }
        };

        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|conn| conn.user_id == user_id)
            .filter(|conn| conn.sender.send(payload.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
