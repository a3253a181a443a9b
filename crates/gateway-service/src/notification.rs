//! User notifications.

use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use gateway_db::db::DbProvider;
use gateway_db::db::query::notification;
use gateway_db::model::notification::{NewNotification, Notification};

pub struct NotificationService {
    provider: Arc<dyn DbProvider>,
}

impl NotificationService {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }

    /// ## Summary
    /// Lists notifications that have reached their scheduled time, newest
    /// first.
    ///
    /// ## Errors
    /// Returns database errors.
    pub async fn list(&self, hdid: &str) -> ServiceResult<Vec<Notification>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(notification::list(&mut conn, hdid, chrono::Utc::now()).await?)
    }

    /// ## Summary
    /// Schedules a notification for a user.
    ///
    /// ## Errors
    /// Returns database errors.
    pub async fn schedule(
        &self,
        hdid: &str,
        content: &str,
        category: &str,
        scheduled_at: chrono::DateTime<chrono::Utc>,
    ) -> ServiceResult<Notification> {
        let mut conn = self.provider.get_connection().await?;
        Ok(notification::insert(
            &mut conn,
            &NewNotification {
                id: uuid::Uuid::new_v4(),
                hdid,
                content,
                category,
                scheduled_at,
            },
        )
        .await?)
    }

    /// ## Summary
    /// Marks a notification as read.
    ///
    /// ## Errors
    /// Returns `NotFound` when the notification is not the user's, or
    /// database errors.
    pub async fn mark_read(&self, hdid: &str, id: uuid::Uuid) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if notification::mark_read(&mut conn, id, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!(
                "Notification {id} not found"
            )));
        }
        Ok(())
    }

    /// ## Summary
    /// Deletes a notification.
    ///
    /// ## Errors
    /// Returns `NotFound` when the notification is not the user's, or
    /// database errors.
    pub async fn remove(&self, hdid: &str, id: uuid::Uuid) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if notification::remove(&mut conn, id, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!(
                "Notification {id} not found"
            )));
        }
        Ok(())
    }
}
