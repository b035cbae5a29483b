//! Caller's profile and user search

use axum::{
    extract::{Multipart, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uspshare_common::db::{ProfileUpdate, UserSummary};
use uspshare_common::read_model::UserProfile;

use super::auth::AuthUser;
use super::form::FormData;
use super::ApiJson;
use crate::error::not_found_as;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .store
        .user_profile(user.id)
        .await
        .map_err(not_found_as("User not found"))?;
    Ok(Json(profile))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(mut update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Value>> {
    update.name = update.name.trim().to_string();
    if update.name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    state
        .store
        .update_profile(user.id, &update)
        .await
        .map_err(not_found_as("User not found"))?;
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

/// POST /api/profile/avatar (multipart field `avatar`)
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut form = FormData::collect(multipart, &["avatar"], state.limits.max_avatar_bytes).await?;
    let avatar = form
        .take_file("avatar")
        .ok_or_else(|| ApiError::BadRequest("Invalid avatar file field".to_string()))?;

    let stored = state
        .storage
        .save_avatar(user.id, avatar.bytes, avatar.file_name.as_deref())
        .await?;
    state
        .store
        .update_avatar(user.id, &stored.url)
        .await
        .map_err(not_found_as("User not found"))?;

    info!(user_id = %user.id, "Avatar updated");
    Ok(Json(json!({ "avatarUrl": stored.url })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/users/search?q=
pub async fn search_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(state.store.search_users(q, user.id).await?))
}
