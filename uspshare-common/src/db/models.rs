//! Database models
//!
//! Row types map one-to-one onto the tables created in [`super::init`].
//! JSON field names are camelCase to match the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role; only admins may edit the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub course: String,
    pub faculty: String,
    pub year_joined: String,
    pub bio: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    pub role: Role,
}

/// Fields supplied at signup
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Owner-editable profile fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub bio: String,
    /// Left unchanged when absent
    pub year_joined: Option<String>,
}

/// Result of a user search; never carries credentials
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
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
    /// Display counter stored with the row; live counts come from the read model
    pub likes: i64,
    pub title: String,
    pub description: String,
    pub semester: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub is_anonymous: bool,
}

/// Metadata for a freshly uploaded file
#[derive(Debug, Clone, Default)]
pub struct NewResource {
    pub user_id: Uuid,
    pub professor_id: Option<Uuid>,
    pub course_code: String,
    pub course: String,
    pub resource_type: String,
    pub file_name: String,
    pub file_url: String,
    pub title: String,
    pub description: String,
    pub semester: String,
    pub tags: Vec<String>,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// What a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum NotificationKind {
    Reply,
    Like,
    CommentLike,
    Share,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor_name: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub resource_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub actor_name: String,
    pub kind: NotificationKind,
    pub message: String,
    pub resource_id: Uuid,
    pub comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    /// Live like count after the toggle
    pub likes: i64,
    pub has_liked: bool,
    /// A new like row was written by this call (drives notifications)
    #[serde(skip)]
    pub created: bool,
}

/// Platform-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub users: i64,
    pub resources: i64,
    pub courses: i64,
}
