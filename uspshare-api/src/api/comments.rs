//! Threaded comments on a resource

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uspshare_common::comment_tree::CommentWithAuthor;
use uspshare_common::notify::Trigger;

use super::auth::AuthUser;
use super::ApiJson;
use crate::error::parse_id;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/resource/:id/comments
///
/// Newest-first forest of root comments with nested replies.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    let resource_id = parse_id(&id, "resource")?;
    Ok(Json(state.store.comment_thread(resource_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    #[serde(default)]
    pub content: String,
    pub parent_id: Option<String>,
}

/// POST /api/resource/:id/comments
///
/// A reply (`parentId` set) notifies the parent comment's author.
pub async fn post_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NewCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentWithAuthor>)> {
    let resource_id = parse_id(&id, "resource")?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment content is required".to_string()));
    }

    let parent_id = match req.parent_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_id(raw, "parent comment")?),
    };

    if state.store.find_resource(resource_id).await?.is_none() {
        return Err(ApiError::NotFound("Resource not found".to_string()));
    }

    let comment = state
        .store
        .create_comment(resource_id, user.id, parent_id, content)
        .await?;

    if let Some(parent_id) = comment.parent_id {
        if let Ok(Some(parent)) = state.store.find_comment(parent_id).await {
            state
                .notifier
                .dispatch(user.id, Trigger::Reply { parent: &parent, reply: &comment })
                .await;
        }
    }

    let created = state.store.comment_with_author(comment.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
