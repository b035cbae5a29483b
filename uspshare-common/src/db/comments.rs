//! Comments on resources

use super::deadline::{bounded, QueryCost};
use super::models::Comment;
use super::store::Store;
use crate::{Error, Result};
use tracing::info;
use uuid::Uuid;

impl Store {
    /// Persist a comment
    ///
    /// A supplied `parent_id` must name an existing comment on the same
    /// resource, otherwise [`Error::InvalidInput`] is returned and nothing is written.
    pub async fn create_comment(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<Comment> {
        if let Some(parent_id) = parent_id {
            match self.find_comment(parent_id).await? {
                Some(parent) if parent.resource_id == resource_id => {}
                _ => {
                    return Err(Error::InvalidInput(
                        "Parent comment not found on this resource".to_string(),
                    ))
                }
            }
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            resource_id,
            user_id,
            parent_id,
            content: content.to_string(),
            created_at: crate::time::now(),
        };

        bounded(
            QueryCost::Point,
            "create_comment",
            sqlx::query(
                "INSERT INTO comments (id, resource_id, user_id, parent_id, content, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(comment.id)
            .bind(comment.resource_id)
            .bind(comment.user_id)
            .bind(comment.parent_id)
            .bind(&comment.content)
            .bind(comment.created_at)
            .execute(self.pool()),
        )
        .await?;

        info!(comment_id = %comment.id, resource_id = %resource_id, "Created comment");
        Ok(comment)
    }

    pub async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        bounded(
            QueryCost::Point,
            "find_comment",
            sqlx::query_as::<_, Comment>(
                "SELECT id, resource_id, user_id, parent_id, content, created_at \
                 FROM comments WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(self.pool()),
        )
        .await
    }

    pub async fn count_user_comments(&self, user_id: Uuid) -> Result<i64> {
        bounded(
            QueryCost::UserAggregate,
            "count_user_comments",
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::test_support::memory_store;

    #[tokio::test]
    async fn test_reply_must_target_same_resource() {
        let store = memory_store().await;
        let user = Uuid::new_v4();
        let resource_a = Uuid::new_v4();
        let resource_b = Uuid::new_v4();

        let root = store.create_comment(resource_a, user, None, "first").await.unwrap();

        let reply = store
            .create_comment(resource_a, user, Some(root.id), "reply")
            .await
            .unwrap();
        assert_eq!(reply.parent_id, Some(root.id));

        let err = store
            .create_comment(resource_b, user, Some(root.id), "elsewhere")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = store
            .create_comment(resource_a, user, Some(Uuid::new_v4()), "dangling")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert_eq!(store.count_user_comments(user).await.unwrap(), 2);
    }
}
