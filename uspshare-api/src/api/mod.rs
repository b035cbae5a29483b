//! HTTP API handlers for uspshare-api

use axum::extract::FromRequest;

use crate::ApiError;

pub mod auth;
pub mod catalog;
pub mod comments;
pub mod files;
pub mod form;
pub mod health;
pub mod likes;
pub mod notifications;
pub mod profile;
pub mod resources;
pub mod stats;

pub use auth::{admin_middleware, auth_middleware, login, signup, AuthUser};
pub use catalog::{
    create_course, create_professor, create_tag, delete_course, delete_professor, delete_tag,
    list_courses, list_professors, list_tags,
};
pub use comments::{list_comments, post_comment};
pub use files::{content_disposition, cors_layer};
pub use health::health_routes;
pub use likes::{my_comment_likes, my_likes, toggle_comment_like, toggle_resource_like};
pub use notifications::{list_notifications, mark_notification_read, share_resource};
pub use profile::{get_profile, search_users, update_profile, upload_avatar};
pub use resources::{
    delete_resource, get_resource, list_resources, my_uploads, related_resources, upload_resource,
};
pub use stats::get_stats;

/// JSON body extractor whose rejections render as `{"error": ...}` with 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
