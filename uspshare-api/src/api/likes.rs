//! Like toggles for resources and comments

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uspshare_common::db::LikeToggle;
use uspshare_common::notify::Trigger;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::error::parse_id;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/resource/:id/like
///
/// Returns `{likes, hasLiked}`. Only a newly created like notifies the uploader.
pub async fn toggle_resource_like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeToggle>> {
    let resource_id = parse_id(&id, "resource")?;
    let resource = state
        .store
        .find_resource(resource_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    let toggle = state.store.toggle_resource_like(user.id, resource_id).await?;
    if toggle.created {
        state
            .notifier
            .dispatch(user.id, Trigger::ResourceLike { resource: &resource })
            .await;
    }
    Ok(Json(toggle))
}

/// POST /api/comment/:id/like
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeToggle>> {
    let comment_id = parse_id(&id, "comment")?;
    let comment = state
        .store
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let toggle = state.store.toggle_comment_like(user.id, comment_id).await?;
    if toggle.created {
        state
            .notifier
            .dispatch(user.id, Trigger::CommentLike { comment: &comment })
            .await;
    }
    Ok(Json(toggle))
}

/// GET /api/my-likes
pub async fn my_likes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Uuid>>> {
    Ok(Json(state.store.liked_resource_ids(user.id).await?))
}

/// GET /api/my-comment-likes
pub async fn my_comment_likes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Uuid>>> {
    Ok(Json(state.store.liked_comment_ids(user.id).await?))
}
