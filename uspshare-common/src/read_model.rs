//! Aggregated read model
//!
//! Externally visible shapes of resources, comments and user profiles. Each
//! view merges the stored row with live like/comment counts and denormalized
//! uploader and professor fields. A missing uploader or professor only blanks
//! those fields; only a missing primary row is [`Error::NotFound`].

use crate::badges::{self, UserStats};
use crate::comment_tree::{self, CommentWithAuthor};
use crate::db::{bounded, QueryCost, Role, Store, User};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Base URL for generated placeholder avatars
pub const PLACEHOLDER_AVATAR_BASE: &str = "https://i.pravatar.cc/150?u=";

const RESOURCE_VIEW_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.professor_id, r.course_code, r.course, r.resource_type,
           r.file_name, r.file_url, r.upload_date, r.title, r.description, r.semester,
           r.tags, r.is_anonymous,
           u.name AS uploader_name,
           NULLIF(u.avatar_url, '') AS uploader_avatar,
           p.name AS professor_name,
           p.avatar_url AS professor_avatar,
           (SELECT COUNT(*) FROM likes l WHERE l.resource_id = r.id) AS likes,
           (SELECT COUNT(*) FROM comments c WHERE c.resource_id = r.id) AS comments
    FROM resources r
    LEFT JOIN users u ON u.id = r.user_id
    LEFT JOIN professors p ON p.id = r.professor_id
"#;

/// Full resource shape used by listings and the detail page
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor_id: Option<Uuid>,
    pub course_code: String,
    pub course: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub file_name: String,
    pub file_url: String,
    pub upload_date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub semester: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub is_anonymous: bool,
    pub uploader_name: Option<String>,
    pub uploader_avatar: Option<String>,
    pub professor_name: Option<String>,
    pub professor_avatar: Option<String>,
    /// Live count of like rows
    pub likes: i64,
    /// Live count of comment rows
    pub comments: i64,
}

/// Narrow projection used for "more from this course"
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RelatedResource {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub professor_name: Option<String>,
    pub professor_avatar: Option<String>,
}

/// Maximum number of related resources returned
pub const RELATED_LIMIT: i64 = 4;

/// Profile page shape: account fields plus computed stats and badges
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub course: String,
    pub faculty: String,
    pub year_joined: String,
    pub bio: String,
    pub avatar: String,
    pub role: Role,
    pub stats: UserStats,
    pub badges: Vec<&'static str>,
}

impl UserProfile {
    pub fn from_user(user: User, stats: UserStats) -> Self {
        let avatar = if user.avatar_url.trim().is_empty() {
            placeholder_avatar(&user.email)
        } else {
            user.avatar_url
        };

        Self {
            badges: badges::evaluate(&stats),
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            course: user.course,
            faculty: user.faculty,
            year_joined: user.year_joined,
            bio: user.bio,
            avatar,
            role: user.role,
            stats,
        }
    }
}

/// Deterministic placeholder avatar for an email address
pub fn placeholder_avatar(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", PLACEHOLDER_AVATAR_BASE, hex)
}

impl Store {
    /// Every resource, in natural storage order
    pub async fn list_resource_views(&self) -> Result<Vec<ResourceView>> {
        bounded(
            QueryCost::Aggregate,
            "list_resource_views",
            sqlx::query_as::<_, ResourceView>(RESOURCE_VIEW_SELECT).fetch_all(self.pool()),
        )
        .await
    }

    /// One resource by id
    pub async fn resource_view(&self, id: Uuid) -> Result<ResourceView> {
        let sql = format!("{} WHERE r.id = ?", RESOURCE_VIEW_SELECT);
        bounded(
            QueryCost::Aggregate,
            "resource_view",
            sqlx::query_as::<_, ResourceView>(&sql).bind(id).fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("Resource {}", id)))
    }

    /// Resources uploaded by `user_id`, newest first
    pub async fn user_resource_views(&self, user_id: Uuid) -> Result<Vec<ResourceView>> {
        let sql = format!(
            "{} WHERE r.user_id = ? ORDER BY r.upload_date DESC",
            RESOURCE_VIEW_SELECT
        );
        bounded(
            QueryCost::UserAggregate,
            "user_resource_views",
            sqlx::query_as::<_, ResourceView>(&sql).bind(user_id).fetch_all(self.pool()),
        )
        .await
    }

    /// Up to [`RELATED_LIMIT`] other resources sharing the course code of `id`
    pub async fn related_resources(&self, id: Uuid) -> Result<Vec<RelatedResource>> {
        let resource = self
            .find_resource(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Resource {}", id)))?;

        bounded(
            QueryCost::List,
            "related_resources",
            sqlx::query_as::<_, RelatedResource>(
                "SELECT r.id, r.title, r.resource_type, \
                        p.name AS professor_name, p.avatar_url AS professor_avatar \
                 FROM resources r LEFT JOIN professors p ON p.id = r.professor_id \
                 WHERE r.course_code = ? AND r.id <> ? LIMIT ?",
            )
            .bind(&resource.course_code)
            .bind(id)
            .bind(RELATED_LIMIT)
            .fetch_all(self.pool()),
        )
        .await
    }

    /// Flat comment rows of a resource with author fields and live like counts
    pub async fn comment_rows(&self, resource_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        bounded(
            QueryCost::Aggregate,
            "comment_rows",
            sqlx::query_as::<_, CommentWithAuthor>(
                "SELECT c.id, c.resource_id, c.user_id, c.parent_id, c.content, c.created_at, \
                        COALESCE(u.name, '') AS author_name, \
                        NULLIF(u.avatar_url, '') AS author_avatar, \
                        (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS likes \
                 FROM comments c LEFT JOIN users u ON u.id = c.user_id \
                 WHERE c.resource_id = ?",
            )
            .bind(resource_id)
            .fetch_all(self.pool()),
        )
        .await
    }

    /// Threaded, newest-first comments of a resource
    pub async fn comment_thread(&self, resource_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let rows = self.comment_rows(resource_id).await?;
        Ok(comment_tree::build_tree(rows))
    }

    /// One comment with its author fields, as returned after posting
    pub async fn comment_with_author(&self, id: Uuid) -> Result<CommentWithAuthor> {
        bounded(
            QueryCost::Point,
            "comment_with_author",
            sqlx::query_as::<_, CommentWithAuthor>(
                "SELECT c.id, c.resource_id, c.user_id, c.parent_id, c.content, c.created_at, \
                        COALESCE(u.name, '') AS author_name, \
                        NULLIF(u.avatar_url, '') AS author_avatar, \
                        (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS likes \
                 FROM comments c LEFT JOIN users u ON u.id = c.user_id \
                 WHERE c.id = ?",
            )
            .bind(id)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("Comment {}", id)))
    }

    /// Activity counters of a user; likes and reputation are not tracked yet
    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let (uploads, comments) = tokio::try_join!(
            self.count_user_uploads(user_id),
            self.count_user_comments(user_id),
        )?;

        Ok(UserStats {
            uploads,
            comments,
            likes: 0,
            reputation: 0,
        })
    }

    /// Profile view with computed stats and badges
    pub async fn user_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))?;
        let stats = self.user_stats(user_id).await?;
        Ok(UserProfile::from_user(user, stats))
    }
}
