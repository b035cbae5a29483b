//! Catalog reference data: courses, professors, tags

use super::deadline::{bounded, QueryCost};
use super::models::{Course, Professor, Tag};
use super::store::Store;
use crate::{Error, Result};
use tracing::info;
use uuid::Uuid;

impl Store {
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        bounded(
            QueryCost::List,
            "list_courses",
            sqlx::query_as::<_, Course>("SELECT id, code, name FROM courses ORDER BY code")
                .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn create_course(&self, code: &str, name: &str) -> Result<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
        };
        bounded(
            QueryCost::Point,
            "create_course",
            sqlx::query("INSERT INTO courses (id, code, name) VALUES (?, ?, ?)")
                .bind(course.id)
                .bind(&course.code)
                .bind(&course.name)
                .execute(self.pool()),
        )
        .await?;

        info!(course_id = %course.id, code = %course.code, "Created course");
        Ok(course)
    }

    pub async fn delete_course(&self, id: Uuid) -> Result<()> {
        self.delete_catalog_row("DELETE FROM courses WHERE id = ?", "delete_course", id, "Course")
            .await
    }

    pub async fn list_professors(&self) -> Result<Vec<Professor>> {
        bounded(
            QueryCost::List,
            "list_professors",
            sqlx::query_as::<_, Professor>(
                "SELECT id, name, avatar_url FROM professors ORDER BY name",
            )
            .fetch_all(self.pool()),
        )
        .await
    }

    /// Create a professor with a caller-chosen id (the avatar file is named after it)
    pub async fn create_professor(
        &self,
        id: Uuid,
        name: &str,
        avatar_url: Option<String>,
    ) -> Result<Professor> {
        let professor = Professor {
            id,
            name: name.to_string(),
            avatar_url,
        };
        bounded(
            QueryCost::Point,
            "create_professor",
            sqlx::query("INSERT INTO professors (id, name, avatar_url) VALUES (?, ?, ?)")
                .bind(professor.id)
                .bind(&professor.name)
                .bind(professor.avatar_url.as_deref())
                .execute(self.pool()),
        )
        .await?;

        info!(professor_id = %professor.id, "Created professor");
        Ok(professor)
    }

    pub async fn find_professor(&self, id: Uuid) -> Result<Option<Professor>> {
        bounded(
            QueryCost::Point,
            "find_professor",
            sqlx::query_as::<_, Professor>("SELECT id, name, avatar_url FROM professors WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool()),
        )
        .await
    }

    pub async fn delete_professor(&self, id: Uuid) -> Result<()> {
        self.delete_catalog_row(
            "DELETE FROM professors WHERE id = ?",
            "delete_professor",
            id,
            "Professor",
        )
        .await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        bounded(
            QueryCost::List,
            "list_tags",
            sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
                .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        bounded(
            QueryCost::Point,
            "create_tag",
            sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
                .bind(tag.id)
                .bind(&tag.name)
                .execute(self.pool()),
        )
        .await?;

        info!(tag_id = %tag.id, "Created tag");
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: Uuid) -> Result<()> {
        self.delete_catalog_row("DELETE FROM tags WHERE id = ?", "delete_tag", id, "Tag")
            .await
    }

    async fn delete_catalog_row(
        &self,
        sql: &'static str,
        op: &'static str,
        id: Uuid,
        label: &str,
    ) -> Result<()> {
        let result = bounded(
            QueryCost::Point,
            op,
            sqlx::query(sql).bind(id).execute(self.pool()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} {}", label, id)));
        }
        info!(id = %id, "{} deleted", label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::test_support::memory_store;

    #[tokio::test]
    async fn test_courses_sorted_by_code() {
        let store = memory_store().await;
        store.create_course("MAT0111", "Calculus I").await.unwrap();
        store.create_course("MAC0110", "Intro to CS").await.unwrap();

        let codes: Vec<_> = store
            .list_courses()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["MAC0110", "MAT0111"]);
    }

    #[tokio::test]
    async fn test_delete_missing_tag_is_not_found() {
        let store = memory_store().await;
        let tag = store.create_tag("exam").await.unwrap();

        store.delete_tag(tag.id).await.unwrap();
        let err = store.delete_tag(tag.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_professor_avatar_is_optional() {
        let store = memory_store().await;
        let id = Uuid::new_v4();
        store.create_professor(id, "Dr. Silva", None).await.unwrap();

        let found = store.find_professor(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Dr. Silva");
        assert!(found.avatar_url.is_none());
    }
}
