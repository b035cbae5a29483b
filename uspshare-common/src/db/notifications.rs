//! Notification persistence

use super::deadline::{bounded, QueryCost};
use super::models::{NewNotification, Notification};
use super::store::Store;
use crate::Result;
use uuid::Uuid;

impl Store {
    pub async fn insert_notification(&self, new: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.recipient_id,
            actor_name: new.actor_name,
            kind: new.kind,
            message: new.message,
            resource_id: new.resource_id,
            comment_id: new.comment_id,
            is_read: false,
            created_at: crate::time::now(),
        };

        bounded(
            QueryCost::Point,
            "insert_notification",
            sqlx::query(
                "INSERT INTO notifications (id, user_id, actor_name, kind, message, resource_id, \
                 comment_id, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(notification.id)
            .bind(notification.user_id)
            .bind(&notification.actor_name)
            .bind(notification.kind)
            .bind(&notification.message)
            .bind(notification.resource_id)
            .bind(notification.comment_id)
            .bind(notification.is_read)
            .bind(notification.created_at)
            .execute(self.pool()),
        )
        .await?;

        Ok(notification)
    }

    /// Newest-first notifications for `user_id`, at most `limit`
    pub async fn notifications_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>> {
        bounded(
            QueryCost::List,
            "notifications_for_user",
            sqlx::query_as::<_, Notification>(
                "SELECT id, user_id, actor_name, kind, message, resource_id, comment_id, is_read, created_at \
                 FROM notifications WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool()),
        )
        .await
    }

    /// Mark a notification read; only its recipient can. Returns whether a row changed.
    pub async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = bounded(
            QueryCost::Point,
            "mark_notification_read",
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(self.pool()),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NotificationKind;
    use crate::db::store::test_support::memory_store;

    fn share_for(recipient_id: Uuid) -> NewNotification {
        NewNotification {
            recipient_id,
            actor_name: "Ana".to_string(),
            kind: NotificationKind::Share,
            message: "shared the resource 'Lista 1' with you.".to_string(),
            resource_id: Uuid::new_v4(),
            comment_id: None,
        }
    }

    #[tokio::test]
    async fn test_listing_is_capped_and_newest_first() {
        let store = memory_store().await;
        let bob = Uuid::new_v4();
        for _ in 0..5 {
            store.insert_notification(share_for(bob)).await.unwrap();
        }
        store.insert_notification(share_for(Uuid::new_v4())).await.unwrap();

        let listed = store.notifications_for_user(bob, 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(listed.iter().all(|n| n.user_id == bob && !n.is_read));
        assert_eq!(listed[0].kind, NotificationKind::Share);
    }

    #[tokio::test]
    async fn test_mark_read_is_recipient_scoped() {
        let store = memory_store().await;
        let bob = Uuid::new_v4();
        let stored = store.insert_notification(share_for(bob)).await.unwrap();

        assert!(!store.mark_notification_read(stored.id, Uuid::new_v4()).await.unwrap());
        assert!(store.mark_notification_read(stored.id, bob).await.unwrap());

        let listed = store.notifications_for_user(bob, 50).await.unwrap();
        assert!(listed[0].is_read);
    }
}
