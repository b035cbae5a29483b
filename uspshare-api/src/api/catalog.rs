//! Reference data: courses, professors and tags
//!
//! Listing is public. Creation and deletion sit behind the admin gate.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uspshare_common::db::{Course, Professor, Tag};
use uuid::Uuid;

use super::form::FormData;
use super::ApiJson;
use crate::error::{not_found_as, parse_id};
use crate::{ApiError, ApiResult, AppState};

/// GET /api/data/courses
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.store.list_courses().await?))
}

/// GET /api/data/professors
pub async fn list_professors(State(state): State<AppState>) -> ApiResult<Json<Vec<Professor>>> {
    Ok(Json(state.store.list_professors().await?))
}

/// GET /api/data/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.store.list_tags().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewTagRequest {
    #[serde(default)]
    pub name: String,
}

/// POST /api/admin/tags
pub async fn create_tag(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Tag name is required".to_string()));
    }
    let tag = state.store.create_tag(name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /api/admin/tags/:id
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "tag")?;
    state
        .store
        .delete_tag(id)
        .await
        .map_err(not_found_as("Tag not found"))?;
    Ok(Json(json!({ "message": "Tag deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct NewCourseRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// POST /api/admin/courses
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let (code, name) = (req.code.trim(), req.name.trim());
    if code.is_empty() || name.is_empty() {
        return Err(ApiError::BadRequest(
            "Course name and code are required".to_string(),
        ));
    }
    let course = state.store.create_course(code, name).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// DELETE /api/admin/courses/:id
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "course")?;
    state
        .store
        .delete_course(id)
        .await
        .map_err(not_found_as("Course not found"))?;
    Ok(Json(json!({ "message": "Course deleted successfully" })))
}

/// POST /api/admin/professors (multipart: name, optional avatar)
pub async fn create_professor(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Professor>)> {
    let mut form = FormData::collect(multipart, &["avatar"], state.limits.max_avatar_bytes).await?;
    let name = form.text("name");
    if name.is_empty() {
        return Err(ApiError::BadRequest("Professor name is required".to_string()));
    }

    let id = Uuid::new_v4();
    let avatar_url = match form.take_file("avatar") {
        Some(avatar) if !avatar.bytes.is_empty() => Some(
            state
                .storage
                .save_avatar(id, avatar.bytes, avatar.file_name.as_deref())
                .await?
                .url,
        ),
        _ => None,
    };

    match state.store.create_professor(id, &name, avatar_url.clone()).await {
        Ok(professor) => Ok((StatusCode::CREATED, Json(professor))),
        Err(e) => {
            if let Some(url) = avatar_url {
                state.storage.remove(&url).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/professors/:id
///
/// The stored avatar goes with the row.
pub async fn delete_professor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "professor")?;
    let avatar_url = state
        .store
        .find_professor(id)
        .await?
        .and_then(|p| p.avatar_url);

    state
        .store
        .delete_professor(id)
        .await
        .map_err(not_found_as("Professor not found"))?;

    if let Some(url) = avatar_url {
        state.storage.remove(&url).await;
    }
    Ok(Json(json!({ "message": "Professor deleted successfully" })))
}
