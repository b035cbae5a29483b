//! Notification inbox and resource sharing

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uspshare_common::db::Notification;
use uspshare_common::notify::Trigger;

use super::auth::AuthUser;
use super::ApiJson;
use crate::error::parse_id;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .store
        .notifications_for_user(user.id, state.limits.notification_limit)
        .await?;
    Ok(Json(notifications))
}

/// POST /api/notifications/:id/read
///
/// Someone else's notification is left untouched and still answered with 200.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "notification")?;
    let changed = state.store.mark_notification_read(id, user.id).await?;
    if !changed {
        debug!(notification_id = %id, user_id = %user.id, "Mark-as-read matched nothing");
    }
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub recipient_id: String,
}

/// POST /api/resource/:id/share
///
/// The notification is the whole effect of a share, so failing to record it
/// fails the request.
pub async fn share_resource(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ShareRequest>,
) -> ApiResult<Json<Value>> {
    let resource_id = parse_id(&id, "resource")?;
    let recipient_id = parse_id(req.recipient_id.trim(), "recipient")?;

    if state.store.find_user_by_id(recipient_id).await?.is_none() {
        return Err(ApiError::BadRequest("Invalid recipient".to_string()));
    }

    let resource = state
        .store
        .find_resource(resource_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    state
        .notifier
        .dispatch(user.id, Trigger::Share { resource: &resource, recipient_id })
        .await
        .ok_or_else(|| ApiError::Internal("Failed to create share notification".to_string()))?;

    Ok(Json(json!({ "message": "Resource shared successfully" })))
}
