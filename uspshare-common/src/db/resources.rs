//! Uploaded resources and owner-scoped deletion

use super::deadline::{bounded, QueryCost};
use super::models::{NewResource, Resource};
use super::store::Store;
use crate::{Error, Result};
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;

const RESOURCE_COLUMNS: &str = "id, user_id, professor_id, course_code, course, resource_type, \
                                file_name, file_url, upload_date, likes, title, description, \
                                semester, tags, is_anonymous";

impl Store {
    pub async fn create_resource(&self, new_resource: NewResource) -> Result<Resource> {
        let resource = Resource {
            id: Uuid::new_v4(),
            user_id: new_resource.user_id,
            professor_id: new_resource.professor_id,
            course_code: new_resource.course_code,
            course: new_resource.course,
            resource_type: new_resource.resource_type,
            file_name: new_resource.file_name,
            file_url: new_resource.file_url,
            upload_date: crate::time::now(),
            likes: 0,
            title: new_resource.title,
            description: new_resource.description,
            semester: new_resource.semester,
            tags: new_resource.tags,
            is_anonymous: new_resource.is_anonymous,
        };

        bounded(
            QueryCost::Point,
            "create_resource",
            sqlx::query(
                "INSERT INTO resources (id, user_id, professor_id, course_code, course, resource_type, \
                 file_name, file_url, upload_date, likes, title, description, semester, tags, is_anonymous) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(resource.id)
            .bind(resource.user_id)
            .bind(resource.professor_id)
            .bind(&resource.course_code)
            .bind(&resource.course)
            .bind(&resource.resource_type)
            .bind(&resource.file_name)
            .bind(&resource.file_url)
            .bind(resource.upload_date)
            .bind(resource.likes)
            .bind(&resource.title)
            .bind(&resource.description)
            .bind(&resource.semester)
            .bind(Json(&resource.tags))
            .bind(resource.is_anonymous)
            .execute(self.pool()),
        )
        .await?;

        info!(resource_id = %resource.id, user_id = %resource.user_id, "Created resource");
        Ok(resource)
    }

    pub async fn find_resource(&self, id: Uuid) -> Result<Option<Resource>> {
        let sql = format!("SELECT {} FROM resources WHERE id = ?", RESOURCE_COLUMNS);
        bounded(
            QueryCost::Point,
            "find_resource",
            sqlx::query_as::<_, Resource>(&sql).bind(id).fetch_optional(self.pool()),
        )
        .await
    }

    pub async fn count_user_uploads(&self, user_id: Uuid) -> Result<i64> {
        bounded(
            QueryCost::UserAggregate,
            "count_user_uploads",
            sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool()),
        )
        .await
    }

    /// Delete a resource owned by `owner_id`, then cascade to its likes and comments
    ///
    /// Fails with [`Error::Forbidden`] when no row matches both the id and the
    /// owner. Cascade steps run after the primary delete; their failures are
    /// logged and do not fail the call.
    pub async fn delete_resource_owned(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let result = bounded(
            QueryCost::Point,
            "delete_resource",
            sqlx::query("DELETE FROM resources WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(owner_id)
                .execute(self.pool()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Forbidden(
                "Permission denied or resource not found".to_string(),
            ));
        }

        self.cascade_resource_delete(id).await;
        info!(resource_id = %id, "Deleted resource");
        Ok(())
    }

    async fn cascade_resource_delete(&self, resource_id: Uuid) {
        let steps: [(&'static str, &'static str); 3] = [
            (
                "delete_resource_likes",
                "DELETE FROM likes WHERE resource_id = ?",
            ),
            (
                "delete_resource_comment_likes",
                "DELETE FROM comment_likes WHERE comment_id IN \
                 (SELECT id FROM comments WHERE resource_id = ?)",
            ),
            (
                "delete_resource_comments",
                "DELETE FROM comments WHERE resource_id = ?",
            ),
        ];

        for (op, sql) in steps {
            let outcome = bounded(
                QueryCost::Aggregate,
                op,
                sqlx::query(sql).bind(resource_id).execute(self.pool()),
            )
            .await;

            if let Err(e) = outcome {
                warn!(resource_id = %resource_id, step = op, error = %e, "Cascade delete step failed");
            }
        }
    }

    /// Adjust the stored display counter; clamps at zero
    pub(crate) async fn bump_resource_like_counter(&self, resource_id: Uuid, delta: i64) {
        let outcome = bounded(
            QueryCost::Point,
            "bump_resource_like_counter",
            sqlx::query("UPDATE resources SET likes = MAX(likes + ?, 0) WHERE id = ?")
                .bind(delta)
                .bind(resource_id)
                .execute(self.pool()),
        )
        .await;

        if let Err(e) = outcome {
            warn!(resource_id = %resource_id, error = %e, "Failed to update like counter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewUser;
    use crate::db::store::test_support::memory_store;

    async fn owner(store: &Store) -> Uuid {
        store
            .create_user(NewUser {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn upload(user_id: Uuid) -> NewResource {
        NewResource {
            user_id,
            course_code: "MAC0110".to_string(),
            title: "Lista 1".to_string(),
            file_name: "lista1.pdf".to_string(),
            file_url: "/uploads/abc.pdf".to_string(),
            tags: vec!["exam".to_string(), "2024".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find_roundtrips_tags() {
        let store = memory_store().await;
        let user_id = owner(&store).await;

        let created = store.create_resource(upload(user_id)).await.unwrap();
        let found = store.find_resource(created.id).await.unwrap().unwrap();

        assert_eq!(found.tags, vec!["exam", "2024"]);
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.professor_id, None);
        assert_eq!(store.count_user_uploads(user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let store = memory_store().await;
        let user_id = owner(&store).await;
        let resource = store.create_resource(upload(user_id)).await.unwrap();

        let err = store
            .delete_resource_owned(resource.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(store.find_resource(resource.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_like_counter_never_negative() {
        let store = memory_store().await;
        let user_id = owner(&store).await;
        let resource = store.create_resource(upload(user_id)).await.unwrap();

        store.bump_resource_like_counter(resource.id, -1).await;
        let found = store.find_resource(resource.id).await.unwrap().unwrap();
        assert_eq!(found.likes, 0);
    }
}
