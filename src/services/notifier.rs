use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::database::{
    models::{Notification, NotificationInput, NotificationType},
    repositories::NotificationRepository,
};
use crate::services::notification_hub::{NotificationHub, PushEvent};

/// Result of notifying a group of users.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
    pub notified: Vec<i64>,
    pub failed: Vec<i64>,
}

/// Stores a notification, then pushes it to the user's open sockets.
///
/// The stored row is the durable record; the push is fire-and-forget.
#[derive(Clone)]
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    hub: Arc<NotificationHub>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepository>, hub: Arc<NotificationHub>) -> Self {
        Self { repository, hub }
    }

    pub async fn notify(
        &self,
        user_id: i64,
        notification_type: NotificationType,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Result<Notification> {
        let notification = self
            .repository
            .create(NotificationInput {
                user_id,
                notification_type,
                message: message.into(),
                data,
            })
            .await?;

        let delivered = self
            .hub
            .send_to_user(user_id, &PushEvent::from(&notification))
            .await;
        log::debug!(
            "Notification {} for user {} pushed to {} connection(s)",
            notification.id,
            user_id,
            delivered
        );

        Ok(notification)
    }

    /// Notifies each user in turn. A failure for one user is logged and
    /// recorded; the remaining users are still notified.
    pub async fn notify_all(
        &self,
        user_ids: &[i64],
        notification_type: NotificationType,
        message: &str,
        data: serde_json::Value,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        for &user_id in user_ids {
            match self
                .notify(user_id, notification_type, message, data.clone())
                .await
            {
                Ok(_) => report.notified.push(user_id),
                Err(e) => {
                    log::error!(
                        "Failed to notify user {} ({}): {}",
                        user_id,
                        notification_type,
                        e
                    );
                    report.failed.push(user_id);
                }
            }
        }
        report
    }
}
