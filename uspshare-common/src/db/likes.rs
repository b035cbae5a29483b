//! Resource likes and comment likes
//!
//! Toggles delete first and insert only when nothing was deleted. The
//! (user, target) pairs are UNIQUE and the insert is `ON CONFLICT DO NOTHING`,
//! so two racing toggles by one user can never leave duplicate rows.

use super::deadline::{bounded, QueryCost};
use super::models::LikeToggle;
use super::store::Store;
use crate::Result;
use uuid::Uuid;

/// Table and target column of a like kind
#[derive(Debug, Clone, Copy)]
enum LikeTable {
    Resource,
    Comment,
}

impl LikeTable {
    fn delete_sql(self) -> &'static str {
        match self {
            LikeTable::Resource => "DELETE FROM likes WHERE user_id = ? AND resource_id = ?",
            LikeTable::Comment => "DELETE FROM comment_likes WHERE user_id = ? AND comment_id = ?",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            LikeTable::Resource => {
                "INSERT INTO likes (id, user_id, resource_id, created_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(user_id, resource_id) DO NOTHING"
            }
            LikeTable::Comment => {
                "INSERT INTO comment_likes (id, user_id, comment_id, created_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(user_id, comment_id) DO NOTHING"
            }
        }
    }

    fn count_sql(self) -> &'static str {
        match self {
            LikeTable::Resource => "SELECT COUNT(*) FROM likes WHERE resource_id = ?",
            LikeTable::Comment => "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?",
        }
    }
}

impl Store {
    /// Like or un-like a resource for `user_id`
    pub async fn toggle_resource_like(&self, user_id: Uuid, resource_id: Uuid) -> Result<LikeToggle> {
        let toggle = self.toggle(LikeTable::Resource, user_id, resource_id).await?;

        if toggle.created {
            self.bump_resource_like_counter(resource_id, 1).await;
        } else if !toggle.has_liked {
            self.bump_resource_like_counter(resource_id, -1).await;
        }
        Ok(toggle)
    }

    /// Like or un-like a comment for `user_id`
    pub async fn toggle_comment_like(&self, user_id: Uuid, comment_id: Uuid) -> Result<LikeToggle> {
        self.toggle(LikeTable::Comment, user_id, comment_id).await
    }

    async fn toggle(&self, table: LikeTable, user_id: Uuid, target_id: Uuid) -> Result<LikeToggle> {
        let removed = bounded(
            QueryCost::Point,
            "remove_like",
            sqlx::query(table.delete_sql())
                .bind(user_id)
                .bind(target_id)
                .execute(self.pool()),
        )
        .await?
        .rows_affected();

        // nothing removed means the caller ends up liking the target, whether
        // this insert wins or a concurrent toggle already inserted the row
        let created = if removed == 0 {
            self.insert_like(table, user_id, target_id).await?
        } else {
            false
        };

        let likes = bounded(
            QueryCost::Aggregate,
            "count_likes",
            sqlx::query_scalar(table.count_sql())
                .bind(target_id)
                .fetch_one(self.pool()),
        )
        .await?;

        Ok(LikeToggle {
            likes,
            has_liked: removed == 0,
            created,
        })
    }

    /// Insert a like row; `false` when the (user, target) pair already exists
    async fn insert_like(&self, table: LikeTable, user_id: Uuid, target_id: Uuid) -> Result<bool> {
        let inserted = bounded(
            QueryCost::Point,
            "insert_like",
            sqlx::query(table.insert_sql())
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(target_id)
                .bind(crate::time::now())
                .execute(self.pool()),
        )
        .await?
        .rows_affected();
        Ok(inserted == 1)
    }

    /// Live count of likes on a resource
    pub async fn count_resource_likes(&self, resource_id: Uuid) -> Result<i64> {
        bounded(
            QueryCost::Aggregate,
            "count_resource_likes",
            sqlx::query_scalar(LikeTable::Resource.count_sql())
                .bind(resource_id)
                .fetch_one(self.pool()),
        )
        .await
    }

    /// IDs of resources liked by `user_id`
    pub async fn liked_resource_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        bounded(
            QueryCost::UserAggregate,
            "liked_resource_ids",
            sqlx::query_scalar("SELECT resource_id FROM likes WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(self.pool()),
        )
        .await
    }

    /// IDs of comments liked by `user_id`
    pub async fn liked_comment_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        bounded(
            QueryCost::UserAggregate,
            "liked_comment_ids",
            sqlx::query_scalar(
                "SELECT comment_id FROM comment_likes WHERE user_id = ? ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(self.pool()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::test_support::memory_store;

    #[tokio::test]
    async fn test_toggle_flips_state_and_count() {
        let store = memory_store().await;
        let resource = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.toggle_resource_like(alice, resource).await.unwrap();
        assert!(first.has_liked && first.created);
        assert_eq!(first.likes, 1);

        let second = store.toggle_resource_like(bob, resource).await.unwrap();
        assert_eq!(second.likes, 2);

        let undo = store.toggle_resource_like(alice, resource).await.unwrap();
        assert!(!undo.has_liked && !undo.created);
        assert_eq!(undo.likes, second.likes - 1);

        let again = store.toggle_resource_like(alice, resource).await.unwrap();
        assert!(again.has_liked);
        assert_eq!(again.likes, 2);

        assert_eq!(store.count_resource_likes(resource).await.unwrap(), 2);
        assert_eq!(store.liked_resource_ids(alice).await.unwrap(), vec![resource]);
    }

    #[tokio::test]
    async fn test_insert_on_existing_pair_is_a_noop() {
        let store = memory_store().await;
        let resource = Uuid::new_v4();
        let alice = Uuid::new_v4();

        for table in [LikeTable::Resource, LikeTable::Comment] {
            assert!(store.insert_like(table, alice, resource).await.unwrap());
            assert!(!store.insert_like(table, alice, resource).await.unwrap());
        }

        assert_eq!(store.count_resource_likes(resource).await.unwrap(), 1);
        assert_eq!(store.liked_resource_ids(alice).await.unwrap(), vec![resource]);
        assert_eq!(store.liked_comment_ids(alice).await.unwrap(), vec![resource]);

        // a toggle after the duplicate insert still sees exactly one like to remove
        let undo = store.toggle_resource_like(alice, resource).await.unwrap();
        assert_eq!((undo.likes, undo.has_liked, undo.created), (0, false, false));
    }

    #[tokio::test]
    async fn test_comment_like_toggle_is_per_user() {
        let store = memory_store().await;
        let comment = Uuid::new_v4();
        let alice = Uuid::new_v4();

        let liked = store.toggle_comment_like(alice, comment).await.unwrap();
        assert_eq!((liked.likes, liked.has_liked), (1, true));
        assert_eq!(store.liked_comment_ids(alice).await.unwrap(), vec![comment]);

        let unliked = store.toggle_comment_like(alice, comment).await.unwrap();
        assert_eq!((unliked.likes, unliked.has_liked), (0, false));
        assert!(store.liked_comment_ids(alice).await.unwrap().is_empty());
    }
}
