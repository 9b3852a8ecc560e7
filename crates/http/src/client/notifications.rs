//! Notification API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{Notification, UnreadCount};

impl ApiClient {
    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.get("/api/notifications/").await
    }

    pub async fn unread_notifications(&self) -> Result<u64, ClientError> {
        let count: UnreadCount = self.get("/api/notifications/unread_count/").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<(), ClientError> {
        self.send(ApiRequest::post(format!(
            "/api/notifications/{notification_id}/mark_as_read/"
        )))
        .await
        .map(|_| ())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        self.send(ApiRequest::post("/api/notifications/mark_all_as_read/"))
            .await
            .map(|_| ())
    }
}
